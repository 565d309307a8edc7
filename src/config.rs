//! Connection settings
//!
//! Each setting comes from the first source that has it: command-line flag,
//! environment variable (both handled by clap), the `[foreman]` table of the
//! config file, then the built-in default.

use anyhow::{Context, Result, bail};
use foreman::{ConnectionOptions, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_TIMEOUT};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::ConnectionArgs;

/// Get the config directory path
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("foremanctl"))
}

/// Expand ~ and environment variables in a path string
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}

/// Where the config file lives: `--config` if given, else the default
pub fn config_path(explicit: Option<&str>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(expand(path)),
        None => Ok(config_dir()?.join("config.toml")),
    }
}

// ============================================================================
// Config File
// ============================================================================

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub foreman: ForemanSection,
}

/// The `[foreman]` table
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForemanSection {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub verify_tls: Option<bool>,
    /// Seconds
    pub timeout: Option<u64>,
}

impl ConfigFile {
    /// Load the config file at `path`
    ///
    /// A missing file is only an error when it was asked for explicitly.
    pub fn load(path: &Path, explicit: bool) -> Result<Self> {
        if !path.exists() {
            if explicit {
                bail!("Config file not found: {}", path.display());
            }
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

// ============================================================================
// Resolved Settings
// ============================================================================

/// Connection settings after merging every source
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    pub verify_tls: bool,
    pub timeout: Duration,
}

impl Settings {
    pub fn merge(args: &ConnectionArgs, file: &ForemanSection) -> Self {
        Self {
            host: args
                .foreman_host
                .clone()
                .or_else(|| file.host.clone())
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: args.foreman_port.or(file.port).unwrap_or(DEFAULT_PORT),
            user: args.foreman_user.clone().or_else(|| file.user.clone()),
            password: args.foreman_pass.clone().or_else(|| file.password.clone()),
            verify_tls: !args.insecure && file.verify_tls.unwrap_or(true),
            timeout: args
                .timeout
                .or(file.timeout)
                .map_or(DEFAULT_TIMEOUT, Duration::from_secs),
        }
    }

    /// Build client options, prompting for a missing password on a terminal
    pub fn into_options(self) -> Result<ConnectionOptions> {
        let user = self
            .user
            .filter(|u| !u.trim().is_empty())
            .context("No Foreman user given (use --foreman-user, FOREMAN_USER or [foreman] user)")?;

        let password = match self.password.filter(|p| !p.is_empty()) {
            Some(password) => password,
            None => prompt_password(&user)?,
        };

        let options = ConnectionOptions::new(user, password)
            .host(self.host)
            .port(self.port)
            .verify_tls(self.verify_tls)
            .timeout(self.timeout);
        options.validate()?;
        Ok(options)
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "********"))
            .field("verify_tls", &self.verify_tls)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn prompt_password(user: &str) -> Result<String> {
    if !std::io::stdin().is_terminal() {
        bail!("No Foreman password given (use --foreman-pass, FOREMAN_PASS or [foreman] password)");
    }
    dialoguer::Password::new()
        .with_prompt(format!("Foreman password for {user}"))
        .interact()
        .context("Could not read password")
}

// ============================================================================
// Tests
// ============================================================================
