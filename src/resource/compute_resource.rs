//! Compute resource descriptor

use declarative::descriptor::require;
use declarative::{Attributes, Descriptor, Kind, LookupKey, Resolved, ResourceClient, Result};
use serde_json::Value;
use std::fmt;

use super::optional;

/// A hypervisor or cloud endpoint Foreman provisions hosts on
///
/// Provider-specific fields are passed through as given and validated by
/// Foreman, not here.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ComputeResource {
    pub name: String,
    /// Provider name, e.g. `Vmware`, `Libvirt`, `Ovirt`
    pub provider: Option<String>,
    pub url: String,
    pub user: Option<String>,
    pub password: Option<String>,
    pub server: Option<String>,
    pub datacenter: Option<String>,
}

impl Descriptor for ComputeResource {
    fn kind_label(&self) -> &'static str {
        Kind::ComputeResource.label()
    }

    fn validate(&self) -> Result<()> {
        require("name", &self.name)?;
        require("url", &self.url)
    }

    fn resolve(&self, _client: &dyn ResourceClient) -> Result<Resolved> {
        Ok(Resolved::new(
            Kind::ComputeResource,
            LookupKey::by_name(&self.name),
        ))
    }

    fn desired_attributes(&self) -> Attributes {
        Attributes::from([
            ("provider".to_string(), optional(self.provider.as_deref())),
            ("url".to_string(), Value::from(self.url.as_str())),
            ("user".to_string(), optional(self.user.as_deref())),
            ("password".to_string(), optional(self.password.as_deref())),
            ("server".to_string(), optional(self.server.as_deref())),
            ("datacenter".to_string(), optional(self.datacenter.as_deref())),
        ])
    }

    fn write_only(&self) -> &'static [&'static str] {
        &["password"]
    }
}

impl fmt::Debug for ComputeResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComputeResource")
            .field("name", &self.name)
            .field("provider", &self.provider)
            .field("url", &self.url)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "********"))
            .field("server", &self.server)
            .field("datacenter", &self.datacenter)
            .finish()
    }
}
