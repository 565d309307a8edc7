//! Role descriptor

use declarative::descriptor::require;
use declarative::{Attributes, Descriptor, Kind, LookupKey, Resolved, ResourceClient, Result};

/// A Foreman user role, identified by name alone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub name: String,
}

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Descriptor for Role {
    fn kind_label(&self) -> &'static str {
        Kind::Role.label()
    }

    fn validate(&self) -> Result<()> {
        require("name", &self.name)
    }

    fn resolve(&self, _client: &dyn ResourceClient) -> Result<Resolved> {
        Ok(Resolved::new(Kind::Role, LookupKey::by_name(&self.name)))
    }

    fn desired_attributes(&self) -> Attributes {
        Attributes::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use declarative::{
        Action, Call, MemoryClient, ReconcileError, Reconciler, Resource, ResourceId, Target,
    };
    use serde_json::json;

    fn existing(client: &MemoryClient, id: u64, name: &str) {
        let mut attributes = Attributes::new();
        attributes.insert("name".into(), json!(name));
        client.insert(Kind::Role, Resource::new(ResourceId(id), attributes));
    }

    #[test]
    fn test_delete_existing_role() {
        let client = MemoryClient::new();
        existing(&client, 7, "MyRole");

        let result = Reconciler::new(&client)
            .reconcile(&Role::new("MyRole"), Target::Absent)
            .unwrap();

        assert!(result.changed);
        assert_eq!(result.action, Action::Delete);
        assert_eq!(result.resource.as_ref().map(|r| r.id), Some(ResourceId(7)));
        assert_eq!(
            client.mutations(),
            vec![Call::Delete {
                kind: Kind::Role,
                id: ResourceId(7)
            }]
        );
        assert!(client.resources(Kind::Role).is_empty());
    }

    #[test]
    fn test_absent_role_stays_absent() {
        let client = MemoryClient::new();
        existing(&client, 3, "Viewer");

        let result = Reconciler::new(&client)
            .reconcile(&Role::new("MyRole"), Target::Absent)
            .unwrap();

        assert!(!result.changed);
        assert!(result.resource.is_none());
        assert!(client.mutations().is_empty());
    }

    #[test]
    fn test_create_sends_only_the_name() {
        let client = MemoryClient::new();
        let role = Role::new("MyRole");

        let result = Reconciler::new(&client)
            .reconcile(&role, Target::Present)
            .unwrap();
        assert!(result.changed);

        let resolved = role.resolve(&client).unwrap();
        let payload = role.create_attributes(&resolved);
        assert_eq!(payload.len(), 1);
        assert_eq!(payload["name"], json!("MyRole"));
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let client = MemoryClient::new();
        let err = Reconciler::new(&client)
            .reconcile(&Role::new("  "), Target::Present)
            .unwrap_err();

        assert!(matches!(err, ReconcileError::InvalidInput(_)));
        assert!(client.calls().is_empty());
    }
}
