use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use declarative::Target;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "foremanctl")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Declarative management of Foreman resources", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (default: ~/.config/foremanctl/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub output: OutputFormat,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Connection overrides; unset values fall back to the config file
#[derive(Args, Debug, Default)]
pub struct ConnectionArgs {
    /// Foreman host, optionally with scheme
    #[arg(long, env = "FOREMAN_HOST", global = true)]
    pub foreman_host: Option<String>,

    /// Foreman API port
    #[arg(long, env = "FOREMAN_PORT", global = true)]
    pub foreman_port: Option<u16>,

    /// User to authenticate as
    #[arg(long, env = "FOREMAN_USER", global = true)]
    pub foreman_user: Option<String>,

    /// Password for the Foreman user
    #[arg(long, env = "FOREMAN_PASS", global = true, hide_env_values = true)]
    pub foreman_pass: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long, env = "FOREMAN_INSECURE", global = true)]
    pub insecure: bool,

    /// Per-request timeout
    #[arg(long, env = "FOREMAN_TIMEOUT", global = true, value_name = "SECONDS")]
    pub timeout: Option<u64>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Ensure a compute resource is present or absent
    ComputeResource(ComputeResourceArgs),

    /// Ensure an operating system default template binding
    OsDefaultTemplate(OsDefaultTemplateArgs),

    /// Ensure a partition table is present or absent
    Ptable(PtableArgs),

    /// Ensure a role is present or absent
    Role(RoleArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Inspect connection settings
    #[command(subcommand)]
    Config(ConfigCommand),
}

// ============================================================================
// Config Commands
// ============================================================================

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the resolved connection settings (password masked)
    Show,

    /// Print the config file location
    Path,
}

// ============================================================================
// Resource Commands
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StateArg {
    Present,
    Absent,
}

impl From<StateArg> for Target {
    fn from(state: StateArg) -> Self {
        match state {
            StateArg::Present => Self::Present,
            StateArg::Absent => Self::Absent,
        }
    }
}

/// Flags shared by every resource subcommand
#[derive(Args, Debug)]
pub struct EnsureArgs {
    /// Desired state
    #[arg(long, value_enum, default_value_t = StateArg::Present)]
    pub state: StateArg,

    /// Report what would change without changing anything
    #[arg(long)]
    pub check: bool,

    /// Update a present resource whose attributes differ
    #[arg(long)]
    pub correct_drift: bool,
}

#[derive(Args, Debug)]
pub struct ComputeResourceArgs {
    /// Compute resource name
    #[arg(long)]
    pub name: String,

    /// Provider (e.g. Vmware, Libvirt, Ovirt)
    #[arg(long)]
    pub provider: Option<String>,

    /// Provider endpoint URL
    #[arg(long)]
    pub url: String,

    /// User on the provider
    #[arg(long)]
    pub user: Option<String>,

    /// Password on the provider
    #[arg(long, env = "FOREMAN_COMPUTE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Provider server
    #[arg(long)]
    pub server: Option<String>,

    /// Provider datacenter
    #[arg(long)]
    pub datacenter: Option<String>,

    #[command(flatten)]
    pub ensure: EnsureArgs,
}

#[derive(Args, Debug)]
pub struct OsDefaultTemplateArgs {
    /// Operating system name
    #[arg(long)]
    pub operatingsystem: String,

    /// Config template name
    #[arg(long)]
    pub config_template: String,

    /// Template kind name (e.g. PXELinux, provision, finish)
    #[arg(long)]
    pub template_kind: String,

    #[command(flatten)]
    pub ensure: EnsureArgs,
}

#[derive(Args, Debug)]
pub struct PtableArgs {
    /// Partition table name
    #[arg(long)]
    pub name: String,

    /// Layout text
    #[arg(long, conflicts_with = "layout_file")]
    pub layout: Option<String>,

    /// Read the layout from a file
    #[arg(long, value_name = "PATH")]
    pub layout_file: Option<PathBuf>,

    #[command(flatten)]
    pub ensure: EnsureArgs,
}

#[derive(Args, Debug)]
pub struct RoleArgs {
    /// Role name
    #[arg(long)]
    pub name: String,

    #[command(flatten)]
    pub ensure: EnsureArgs,
}
