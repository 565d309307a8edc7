//! Connection settings and API routing tables.

use crate::error::{Error, Result};
use declarative::{Kind, LookupKey, ResourceId};
use std::fmt;
use std::time::Duration;

/// Default Foreman host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default Foreman API port.
pub const DEFAULT_PORT: u16 = 443;

/// Default per-request deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// How to reach and authenticate against a Foreman server.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionOptions {
    /// Host name or IP, optionally with an `http://`/`https://` scheme.
    pub host: String,
    /// TCP port of the API.
    pub port: u16,
    /// User to authenticate as.
    pub user: String,
    /// Password for `user`.
    pub password: String,
    /// Whether to verify the server's TLS certificate.
    pub verify_tls: bool,
    /// Deadline for each request.
    pub timeout: Duration,
}

impl ConnectionOptions {
    /// Settings for `user`/`password` against the default host and port.
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            user: user.into(),
            password: password.into(),
            verify_tls: true,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the host.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the API port.
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Enable or disable TLS certificate verification.
    #[must_use]
    pub fn verify_tls(mut self, verify_tls: bool) -> Self {
        self.verify_tls = verify_tls;
        self
    }

    /// Set the per-request deadline.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Base URL of the server, without a trailing slash.
    ///
    /// Plain hosts use https, except on port 80.
    pub fn base_url(&self) -> Result<String> {
        let host = self.host.trim().trim_end_matches('/');
        if host.is_empty() {
            return Err(Error::InvalidConfig("host must not be empty".to_string()));
        }

        let (scheme, host) = if let Some(rest) = host.strip_prefix("https://") {
            ("https", rest)
        } else if let Some(rest) = host.strip_prefix("http://") {
            ("http", rest)
        } else if self.port == 80 {
            ("http", host)
        } else {
            ("https", host)
        };

        if host.contains('/') || host.is_empty() {
            return Err(Error::InvalidConfig(format!(
                "host '{}' must not contain a path",
                self.host
            )));
        }

        Ok(format!("{scheme}://{host}:{}", self.port))
    }

    /// Check the settings before any request is made.
    pub fn validate(&self) -> Result<()> {
        if self.user.trim().is_empty() {
            return Err(Error::InvalidConfig("user must not be empty".to_string()));
        }
        if self.password.is_empty() {
            return Err(Error::InvalidConfig(
                "password must not be empty".to_string(),
            ));
        }
        self.base_url().map(|_| ())
    }
}

impl fmt::Debug for ConnectionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionOptions")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"********")
            .field("verify_tls", &self.verify_tls)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Where a kind lives in the API and how its payloads are wrapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Collection path, e.g. `/api/roles`.
    pub path: String,
    /// Key wrapping create/update payloads, e.g. `role`.
    pub wrapper: &'static str,
    /// Whether the collection supports `search=name="..."`.
    pub searchable: bool,
}

impl Endpoint {
    /// Route a kind to its collection.
    #[must_use]
    pub fn for_kind(kind: Kind) -> Self {
        let (path, searchable) = match kind {
            Kind::ComputeResource => ("/api/compute_resources".to_string(), true),
            Kind::PartitionTable => ("/api/ptables".to_string(), true),
            Kind::Role => ("/api/roles".to_string(), true),
            Kind::OperatingSystem => ("/api/operatingsystems".to_string(), true),
            Kind::ConfigTemplate => ("/api/config_templates".to_string(), true),
            Kind::OsDefaultTemplate { operatingsystem_id } => (
                format!("/api/operatingsystems/{operatingsystem_id}/os_default_templates"),
                false,
            ),
        };
        Self {
            path,
            wrapper: kind.key(),
            searchable,
        }
    }

    /// Path of one record in the collection.
    #[must_use]
    pub fn member(&self, id: ResourceId) -> String {
        format!("{}/{id}", self.path)
    }

    /// Query parameters for listing candidates matching `hint`.
    #[must_use]
    pub fn list_query(&self, hint: &LookupKey) -> Vec<(&'static str, String)> {
        let mut query = vec![("per_page", "all".to_string())];
        if self.searchable
            && let Some(name) = hint.name()
        {
            query.push(("search", search_by_name(name)));
        }
        query
    }
}

/// Foreman scoped-search expression matching a name exactly.
fn search_by_name(name: &str) -> String {
    let escaped = name.replace('\\', "\\\\").replace('"', "\\\"");
    format!("name=\"{escaped}\"")
}
