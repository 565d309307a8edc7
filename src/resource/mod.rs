//! Desired-state records for the Foreman kinds foremanctl manages
//!
//! Each record is a plain struct with its required fields checked in
//! `validate()`, before any request goes out. Unset optional fields are
//! sent as nothing at all.

mod compute_resource;
mod os_default_template;
mod partition_table;
mod role;

pub use compute_resource::ComputeResource;
pub use os_default_template::OsDefaultTemplate;
pub use partition_table::PartitionTable;
pub use role::Role;

use serde_json::Value;

/// An optional field as an attribute value, `Null` meaning "not specified"
fn optional(value: Option<&str>) -> Value {
    value.map_or(Value::Null, Value::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional() {
        assert_eq!(optional(None), Value::Null);
        assert_eq!(optional(Some("dc01")), Value::from("dc01"));
    }
}
