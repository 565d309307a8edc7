//! In-memory resource client
//!
//! Stores records per kind, assigns ids sequentially and records every call,
//! so reconcile behavior can be checked without a server.
//!
//! ```
//! use declarative::{Kind, LookupKey, MemoryClient, ResourceClient};
//!
//! let client = MemoryClient::new();
//! client.seed(Kind::Role, [("name", "MyRole")]);
//!
//! let found = client.find(Kind::Role, &LookupKey::by_name("MyRole")).unwrap();
//! assert!(found.is_found());
//! ```

use crate::client::{ResourceClient, select_one};
use crate::error::{ApiError, Operation};
use crate::kind::Kind;
use crate::types::{Attributes, Lookup, LookupKey, Resource, ResourceId};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A call observed by [`MemoryClient`]
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Find { kind: Kind, key: LookupKey },
    List { kind: Kind, hint: LookupKey },
    Create { kind: Kind, attributes: Attributes },
    Update {
        kind: Kind,
        id: ResourceId,
        attributes: Attributes,
    },
    Delete { kind: Kind, id: ResourceId },
}

impl Call {
    pub fn kind(&self) -> Kind {
        match self {
            Self::Find { kind, .. }
            | Self::List { kind, .. }
            | Self::Create { kind, .. }
            | Self::Update { kind, .. }
            | Self::Delete { kind, .. } => *kind,
        }
    }

    /// Whether this call changes remote state
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::Create { .. } | Self::Update { .. } | Self::Delete { .. }
        )
    }
}

#[derive(Debug, Default)]
struct State {
    tables: BTreeMap<Kind, Vec<Resource>>,
    last_id: u64,
    calls: Vec<Call>,
    failures: Vec<(Operation, ApiError)>,
    bodiless_delete: bool,
}

impl State {
    fn take_failure(&mut self, operation: Operation) -> Option<ApiError> {
        let index = self.failures.iter().position(|(op, _)| *op == operation)?;
        Some(self.failures.remove(index).1)
    }

    fn next_id(&mut self) -> ResourceId {
        self.last_id += 1;
        ResourceId(self.last_id)
    }
}

/// Resource client backed by in-memory tables
#[derive(Debug, Clone, Default)]
pub struct MemoryClient {
    state: Arc<Mutex<State>>,
}

impl MemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a record with the next free id, bypassing the call log
    pub fn seed<K, V, I>(&self, kind: Kind, fields: I) -> Resource
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let attributes = fields
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let mut state = self.state();
        let resource = Resource::new(state.next_id(), attributes);
        state.tables.entry(kind).or_default().push(resource.clone());
        resource
    }

    /// Insert a record with a fixed id, bypassing the call log
    pub fn insert(&self, kind: Kind, resource: Resource) {
        let mut state = self.state();
        state.last_id = state.last_id.max(resource.id.0);
        state.tables.entry(kind).or_default().push(resource);
    }

    /// Current records of a kind
    pub fn resources(&self, kind: Kind) -> Vec<Resource> {
        self.state().tables.get(&kind).cloned().unwrap_or_default()
    }

    /// Every call made so far, in order
    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    /// Only the create/update/delete calls made so far
    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    /// Make the next call of `operation` fail with `error`
    ///
    /// `Operation::Get` covers `find`, `Operation::List` covers `list`.
    pub fn fail_next(&self, operation: Operation, error: ApiError) {
        self.state().failures.push((operation, error));
    }

    /// Answer deletes without a body, like some API versions do
    pub fn bodiless_delete(&self, enabled: bool) {
        self.state().bodiless_delete = enabled;
    }
}

fn not_found(kind: Kind, id: ResourceId) -> ApiError {
    ApiError::http(404, format!("{} {id} not found", kind.label()))
}

impl ResourceClient for MemoryClient {
    fn list(&self, kind: Kind, hint: &LookupKey) -> Result<Vec<Resource>, ApiError> {
        let mut state = self.state();
        state.calls.push(Call::List {
            kind,
            hint: hint.clone(),
        });
        if let Some(error) = state.take_failure(Operation::List) {
            return Err(error);
        }
        Ok(state.tables.get(&kind).cloned().unwrap_or_default())
    }

    fn find(&self, kind: Kind, key: &LookupKey) -> Result<Lookup, ApiError> {
        let candidates = {
            let mut state = self.state();
            state.calls.push(Call::Find {
                kind,
                key: key.clone(),
            });
            if let Some(error) = state.take_failure(Operation::Get) {
                return Err(error);
            }
            state.tables.get(&kind).cloned().unwrap_or_default()
        };
        select_one(kind, key, candidates)
    }

    fn create(&self, kind: Kind, attributes: &Attributes) -> Result<Resource, ApiError> {
        let mut state = self.state();
        state.calls.push(Call::Create {
            kind,
            attributes: attributes.clone(),
        });
        if let Some(error) = state.take_failure(Operation::Create) {
            return Err(error);
        }
        let resource = Resource::new(state.next_id(), attributes.clone());
        state.tables.entry(kind).or_default().push(resource.clone());
        Ok(resource)
    }

    fn update(
        &self,
        kind: Kind,
        id: ResourceId,
        attributes: &Attributes,
    ) -> Result<Resource, ApiError> {
        let mut state = self.state();
        state.calls.push(Call::Update {
            kind,
            id,
            attributes: attributes.clone(),
        });
        if let Some(error) = state.take_failure(Operation::Update) {
            return Err(error);
        }
        let resource = state
            .tables
            .get_mut(&kind)
            .and_then(|table| table.iter_mut().find(|r| r.id == id))
            .ok_or_else(|| not_found(kind, id))?;
        for (field, value) in attributes {
            resource.attributes.insert(field.clone(), value.clone());
        }
        Ok(resource.clone())
    }

    fn delete(&self, kind: Kind, id: ResourceId) -> Result<Option<Resource>, ApiError> {
        let mut state = self.state();
        state.calls.push(Call::Delete { kind, id });
        if let Some(error) = state.take_failure(Operation::Delete) {
            return Err(error);
        }
        let table = state.tables.entry(kind).or_default();
        let index = table
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| not_found(kind, id))?;
        let removed = table.remove(index);
        if state.bodiless_delete {
            Ok(None)
        } else {
            Ok(Some(removed))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;

    #[test]
    fn test_seed_assigns_sequential_ids() {
        let client = MemoryClient::new();
        let a = client.seed(Kind::Role, [("name", "a")]);
        let b = client.seed(Kind::Role, [("name", "b")]);
        assert_eq!(a.id, ResourceId(1));
        assert_eq!(b.id, ResourceId(2));
        assert!(client.calls().is_empty());
    }

    #[test]
    fn test_find_is_scoped_by_kind() {
        let client = MemoryClient::new();
        client.seed(Kind::Role, [("name", "shared")]);

        let key = LookupKey::by_name("shared");
        assert!(client.find(Kind::Role, &key).unwrap().is_found());
        assert_eq!(
            client.find(Kind::PartitionTable, &key).unwrap(),
            Lookup::Absent
        );
    }

    #[test]
    fn test_find_rejects_ambiguous_matches() {
        let client = MemoryClient::new();
        client.seed(Kind::Role, [("name", "dup")]);
        client.seed(Kind::Role, [("name", "dup")]);

        let err = client
            .find(Kind::Role, &LookupKey::by_name("dup"))
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Ambiguous);
    }

    #[test]
    fn test_default_find_goes_through_list() {
        struct ListOnly(MemoryClient);

        impl ResourceClient for ListOnly {
            fn list(&self, kind: Kind, hint: &LookupKey) -> Result<Vec<Resource>, ApiError> {
                self.0.list(kind, hint)
            }
            fn create(&self, kind: Kind, a: &Attributes) -> Result<Resource, ApiError> {
                self.0.create(kind, a)
            }
            fn update(
                &self,
                kind: Kind,
                id: ResourceId,
                a: &Attributes,
            ) -> Result<Resource, ApiError> {
                self.0.update(kind, id, a)
            }
            fn delete(&self, kind: Kind, id: ResourceId) -> Result<Option<Resource>, ApiError> {
                self.0.delete(kind, id)
            }
        }

        let inner = MemoryClient::new();
        inner.seed(Kind::Role, [("name", "a")]);
        inner.seed(Kind::Role, [("name", "b")]);
        let client = ListOnly(inner.clone());

        let found = client.find(Kind::Role, &LookupKey::by_name("b")).unwrap();
        assert_eq!(found.found().map(|r| r.id), Some(ResourceId(2)));
        assert!(matches!(inner.calls()[0], Call::List { .. }));
    }

    #[test]
    fn test_fail_next_applies_once() {
        let client = MemoryClient::new();
        client.fail_next(Operation::Create, ApiError::http(500, "boom"));

        let attrs = LookupKey::by_name("r").to_attributes();
        assert!(client.create(Kind::Role, &attrs).is_err());
        assert!(client.create(Kind::Role, &attrs).is_ok());
        assert_eq!(client.resources(Kind::Role).len(), 1);
    }

    #[test]
    fn test_update_and_delete_missing_record() {
        let client = MemoryClient::new();
        let err = client.delete(Kind::Role, ResourceId(9)).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::NotFound);

        let err = client
            .update(Kind::Role, ResourceId(9), &Attributes::new())
            .unwrap_err();
        assert_eq!(err.status, Some(404));
    }

    #[test]
    fn test_bodiless_delete() {
        let client = MemoryClient::new();
        let role = client.seed(Kind::Role, [("name", "r")]);
        client.bodiless_delete(true);
        assert_eq!(client.delete(Kind::Role, role.id).unwrap(), None);
        assert!(client.resources(Kind::Role).is_empty());
    }
}
