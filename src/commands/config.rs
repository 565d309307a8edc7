//! `config show` and `config path`

use anyhow::Result;
use serde_json::{Value, json};

use crate::Context;
use crate::cli::{ConfigCommand, OutputFormat};
use crate::config::{self, Settings};
use crate::ui;

pub fn run(ctx: &Context, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show => show(ctx),
        ConfigCommand::Path => path(ctx),
    }
}

fn path(ctx: &Context) -> Result<()> {
    let path = config::config_path(ctx.config.as_deref())?;
    match ctx.output {
        OutputFormat::Json => println!("{}", json!({ "path": path, "exists": path.exists() })),
        OutputFormat::Text => println!("{}", path.display()),
    }
    Ok(())
}

fn show(ctx: &Context) -> Result<()> {
    let path = config::config_path(ctx.config.as_deref())?;
    let settings = ctx.settings()?;

    match ctx.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&to_json(&settings))?),
        OutputFormat::Text => {
            ui::header("Foreman connection");
            let file = if path.exists() {
                path.display().to_string()
            } else {
                format!("{} (not found)", path.display())
            };
            ui::kv("config", &file);
            ui::kv("host", &settings.host);
            ui::kv("port", &settings.port.to_string());
            ui::kv("user", settings.user.as_deref().unwrap_or("(unset)"));
            ui::kv("password", masked(&settings));
            ui::kv("verify_tls", &settings.verify_tls.to_string());
            ui::kv("timeout", &format!("{}s", settings.timeout.as_secs()));
        }
    }
    Ok(())
}

fn masked(settings: &Settings) -> &'static str {
    if settings.password.is_some() {
        "********"
    } else {
        "(unset, prompted when needed)"
    }
}

fn to_json(settings: &Settings) -> Value {
    json!({
        "host": settings.host,
        "port": settings.port,
        "user": settings.user,
        "password": settings.password.as_ref().map(|_| "********"),
        "verify_tls": settings.verify_tls,
        "timeout": settings.timeout.as_secs(),
    })
}
