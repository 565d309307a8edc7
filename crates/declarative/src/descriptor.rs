//! Resource descriptor trait
//!
//! A descriptor is the desired-state record of one resource kind. It knows
//! how to compute its lookup key (possibly through read-only dependent
//! lookups) and what to send when the resource has to be created.

use crate::client::ResourceClient;
use crate::error::{ErrorCategory, Operation, ReconcileError, Result};
use crate::kind::Kind;
use crate::types::{Attributes, Lookup, LookupKey, Resource};
use std::fmt;

/// Where the primary lookup goes and what it matches on
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub kind: Kind,
    pub key: LookupKey,
}

impl Resolved {
    pub fn new(kind: Kind, key: LookupKey) -> Self {
        Self { kind, key }
    }
}

/// Desired state of one resource of a given kind
///
/// # Example
///
/// ```
/// use declarative::{Attributes, Descriptor, Kind, LookupKey, Resolved, ResourceClient, Result};
///
/// #[derive(Debug)]
/// struct Role {
///     name: String,
/// }
///
/// impl Descriptor for Role {
///     fn kind_label(&self) -> &'static str {
///         "role"
///     }
///
///     fn validate(&self) -> Result<()> {
///         declarative::descriptor::require("name", &self.name)
///     }
///
///     fn resolve(&self, _client: &dyn ResourceClient) -> Result<Resolved> {
///         Ok(Resolved::new(Kind::Role, LookupKey::by_name(&self.name)))
///     }
///
///     fn desired_attributes(&self) -> Attributes {
///         Attributes::new()
///     }
/// }
/// ```
pub trait Descriptor: fmt::Debug {
    /// Noun for messages raised before the kind is resolved
    fn kind_label(&self) -> &'static str;

    /// Check required fields before any remote call is made
    fn validate(&self) -> Result<()>;

    /// Compute the kind and lookup key
    ///
    /// Simple kinds answer directly. Dependent kinds resolve indirect
    /// references through `client`; a reference that resolves to nothing
    /// is an input error, never "resource absent".
    fn resolve(&self, client: &dyn ResourceClient) -> Result<Resolved>;

    /// Non-key attributes the operator asked for
    ///
    /// Unset optional fields are `Null` and never sent.
    fn desired_attributes(&self) -> Attributes;

    /// Full payload for `create`: the key merged with the desired attributes
    fn create_attributes(&self, resolved: &Resolved) -> Attributes {
        let mut attributes = resolved.key.to_attributes();
        for (field, value) in self.desired_attributes() {
            if !value.is_null() && !resolved.key.contains(&field) {
                attributes.insert(field, value);
            }
        }
        attributes
    }

    /// Attributes the API accepts but never returns, ignored for drift
    fn write_only(&self) -> &'static [&'static str] {
        &[]
    }
}

/// Fail validation when a required field is blank
pub fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ReconcileError::InvalidInput(format!(
            "missing required argument: {field}"
        )));
    }
    Ok(())
}

/// A read-only lookup needed before the primary lookup can run
///
/// Unlike the primary lookup, finding nothing here is fatal.
#[derive(Debug, Clone)]
pub struct Dependency<'a> {
    pub kind: Kind,
    pub key: LookupKey,
    /// Subject for API failure context, e.g. "operatingsystem" in
    /// "Could not search operatingsystem: ..."
    pub subject: &'a str,
    pub operation: Operation,
    /// Message when nothing matches
    pub missing: String,
}

impl Dependency<'_> {
    /// Run the lookup, turning absence and ambiguity into input errors
    pub fn resolve(self, client: &dyn ResourceClient) -> Result<Resource> {
        log::debug!("Resolving {} {}", self.kind, self.key);
        match client.find(self.kind, &self.key) {
            Ok(Lookup::Found(resource)) => Ok(resource),
            Ok(Lookup::Absent) => Err(ReconcileError::LookupFailed(self.missing)),
            Err(err) if err.category() == ErrorCategory::Ambiguous => Err(
                ReconcileError::LookupAmbiguous(format!("{}: {err}", self.missing_prefix())),
            ),
            Err(err) => Err(ReconcileError::remote_subject(
                self.operation,
                self.subject,
                err,
            )),
        }
    }

    fn missing_prefix(&self) -> String {
        format!("Could not resolve {} {}", self.kind.label(), self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::memory::MemoryClient;
    use serde_json::{Value, json};

    #[derive(Debug)]
    struct Ptable {
        name: String,
        layout: Option<String>,
    }

    impl Descriptor for Ptable {
        fn kind_label(&self) -> &'static str {
            "partition table"
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
            let mut attributes = Attributes::new();
            attributes.insert(
                "layout".into(),
                self.layout.clone().map_or(Value::Null, Value::from),
            );
            attributes
        }
    }

    #[test]
    fn test_create_attributes_merge_key_and_desired() {
        let ptable = Ptable {
            name: "FreeBSD".into(),
            layout: Some("zerombr".into()),
        };
        let resolved = ptable.resolve(&MemoryClient::new()).unwrap();
        let attributes = ptable.create_attributes(&resolved);
        assert_eq!(attributes.get("name"), Some(&json!("FreeBSD")));
        assert_eq!(attributes.get("layout"), Some(&json!("zerombr")));
    }

    #[test]
    fn test_create_attributes_drop_unset_fields() {
        let ptable = Ptable {
            name: "FreeBSD".into(),
            layout: None,
        };
        let resolved = ptable.resolve(&MemoryClient::new()).unwrap();
        let attributes = ptable.create_attributes(&resolved);
        assert!(!attributes.contains_key("layout"));
    }

    #[test]
    fn test_require_rejects_blank() {
        assert!(require("name", "FreeBSD").is_ok());
        let err = require("name", "  ").unwrap_err();
        assert_eq!(err.to_string(), "missing required argument: name");
    }

    fn os_dependency(name: &str) -> Dependency<'static> {
        Dependency {
            kind: Kind::OperatingSystem,
            key: LookupKey::by_name(name),
            subject: "operatingsystem",
            operation: Operation::Search,
            missing: format!("Operatingsystem {name} not found"),
        }
    }

    #[test]
    fn test_dependency_found() {
        let client = MemoryClient::new();
        let os = client.seed(Kind::OperatingSystem, [("name", "CoreOS")]);
        let resolved = os_dependency("CoreOS").resolve(&client).unwrap();
        assert_eq!(resolved.id, os.id);
    }

    #[test]
    fn test_dependency_missing_is_lookup_failed() {
        let client = MemoryClient::new();
        let err = os_dependency("Nonexistent").resolve(&client).unwrap_err();
        assert_eq!(
            err,
            ReconcileError::LookupFailed("Operatingsystem Nonexistent not found".into())
        );
    }

    #[test]
    fn test_dependency_ambiguous() {
        let client = MemoryClient::new();
        client.seed(Kind::OperatingSystem, [("name", "CoreOS")]);
        client.seed(Kind::OperatingSystem, [("name", "CoreOS")]);
        let err = os_dependency("CoreOS").resolve(&client).unwrap_err();
        assert!(matches!(err, ReconcileError::LookupAmbiguous(_)));
    }

    #[test]
    fn test_dependency_api_failure_keeps_context() {
        let client = MemoryClient::new();
        client.fail_next(
            Operation::Get,
            ApiError::http(401, "Unable to authenticate user admin"),
        );
        let err = os_dependency("CoreOS").resolve(&client).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Could not search operatingsystem: Unable to authenticate user admin"
        );
    }
}
