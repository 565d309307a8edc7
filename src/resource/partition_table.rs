//! Partition table descriptor

use declarative::descriptor::require;
use declarative::{Attributes, Descriptor, Kind, LookupKey, Resolved, ResourceClient, Result};

use super::optional;

/// A partition table, keyed by name
///
/// `layout` is the free-form template body; it is sent on create and only
/// compared, never rewritten, unless drift correction is enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionTable {
    pub name: String,
    pub layout: Option<String>,
}

impl PartitionTable {
    pub fn new(name: impl Into<String>, layout: Option<String>) -> Self {
        Self {
            name: name.into(),
            layout,
        }
    }
}

impl Descriptor for PartitionTable {
    fn kind_label(&self) -> &'static str {
        Kind::PartitionTable.label()
    }

    fn validate(&self) -> Result<()> {
        require("name", &self.name)
    }

    fn resolve(&self, _client: &dyn ResourceClient) -> Result<Resolved> {
        Ok(Resolved::new(
            Kind::PartitionTable,
            LookupKey::by_name(&self.name),
        ))
    }

    fn desired_attributes(&self) -> Attributes {
        Attributes::from([("layout".to_string(), optional(self.layout.as_deref()))])
    }
}
