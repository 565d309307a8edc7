mod cli;
mod commands;
mod config;
mod resource;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command, ConnectionArgs, OutputFormat};
use config::{ConfigFile, Settings};
use std::io;
use std::process::ExitCode;

/// Global context for the application
pub struct Context {
    /// Only print what changed
    pub quiet: bool,
    pub output: OutputFormat,
    /// `--config`, if given
    pub config: Option<String>,
    pub connection: ConnectionArgs,
}

impl Context {
    /// Connection settings merged from flags, environment and config file
    pub fn settings(&self) -> Result<Settings> {
        let path = config::config_path(self.config.as_deref())?;
        let file = ConfigFile::load(&path, self.config.is_some())?;
        Ok(Settings::merge(&self.connection, &file.foreman))
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        quiet: cli.quiet,
        output: cli.output,
        config: cli.config,
        connection: cli.connection,
    };

    match run(&ctx, cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            ui::failure(ctx.output, &err);
            ExitCode::FAILURE
        }
    }
}

fn run(ctx: &Context, command: Command) -> Result<()> {
    match command {
        Command::ComputeResource(args) => commands::ensure::compute_resource(ctx, args),
        Command::OsDefaultTemplate(args) => commands::ensure::os_default_template(ctx, args),
        Command::Ptable(args) => commands::ensure::ptable(ctx, args),
        Command::Role(args) => commands::ensure::role(ctx, args),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "foremanctl", &mut io::stdout());
            Ok(())
        }
        Command::Config(cmd) => commands::config::run(ctx, cmd),
    }
}
