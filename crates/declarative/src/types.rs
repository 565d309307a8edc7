//! Core types for declarative reconciliation

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Named attributes of a remote record
pub type Attributes = BTreeMap<String, Value>;

/// Identifier assigned to a resource by the remote system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(pub u64);

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ResourceId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// A record owned by the remote system
///
/// Always carries an identifier; every other field is kept as-is in
/// `attributes`. Serializes back to the flat shape the API returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    #[serde(flatten)]
    pub attributes: Attributes,
}

impl Resource {
    pub fn new(id: ResourceId, attributes: Attributes) -> Self {
        Self { id, attributes }
    }

    /// Get a raw attribute
    pub fn get(&self, field: &str) -> Option<&Value> {
        if field == "id" {
            return None;
        }
        self.attributes.get(field)
    }

    /// Get a string attribute
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    /// Get an attribute holding another resource's id (e.g. `template_kind_id`)
    pub fn get_id(&self, field: &str) -> Option<ResourceId> {
        self.get(field).and_then(value_as_id).map(ResourceId)
    }

    /// The `name` attribute, if the record has one
    pub fn name(&self) -> Option<&str> {
        self.get_str("name")
    }

    /// Whether `field` holds a value equal to `expected`
    pub fn field_equals(&self, field: &str, expected: &Value) -> bool {
        if field == "id" {
            return values_equal(&Value::from(self.id.0), expected);
        }
        self.attributes
            .get(field)
            .is_some_and(|actual| values_equal(actual, expected))
    }
}

/// Compare two JSON values the way the API means them
///
/// Numbers compare numerically and a number equals its decimal string form,
/// since ids come back either way depending on the endpoint.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            n.to_string() == *s
        }
        _ => a == b,
    }
}

fn value_as_id(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// The attribute subset identifying "the same" resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LookupKey(BTreeMap<String, Value>);

impl LookupKey {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key on the `name` field alone
    pub fn by_name(name: impl Into<String>) -> Self {
        Self::new().with("name", name.into())
    }

    /// Add a key field
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// The `name` field, used by clients as a search hint
    pub fn name(&self) -> Option<&str> {
        self.get("name").and_then(Value::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check whether every key field equals the resource's attribute
    pub fn matches(&self, resource: &Resource) -> bool {
        self.0
            .iter()
            .all(|(field, expected)| resource.field_equals(field, expected))
    }

    /// The key fields as an attribute map, the base of a create payload
    pub fn to_attributes(&self) -> Attributes {
        self.0.clone()
    }
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, value) in &self.0 {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            match value {
                Value::String(s) => write!(f, "{field}={s:?}")?,
                other => write!(f, "{field}={other}")?,
            }
        }
        Ok(())
    }
}

/// Outcome of a primary lookup
///
/// "Not found" is an ordinary answer here; transport and server faults
/// travel separately as errors.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Found(Resource),
    Absent,
}

impl Lookup {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn found(&self) -> Option<&Resource> {
        match self {
            Self::Found(resource) => Some(resource),
            Self::Absent => None,
        }
    }

    pub fn into_option(self) -> Option<Resource> {
        match self {
            Self::Found(resource) => Some(resource),
            Self::Absent => None,
        }
    }
}

impl From<Option<Resource>> for Lookup {
    fn from(resource: Option<Resource>) -> Self {
        match resource {
            Some(resource) => Self::Found(resource),
            None => Self::Absent,
        }
    }
}

/// Wanted existence state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    #[default]
    Present,
    Absent,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present => write!(f, "present"),
            Self::Absent => write!(f, "absent"),
        }
    }
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "present" => Ok(Self::Present),
            "absent" => Ok(Self::Absent),
            other => Err(format!(
                "invalid state '{other}' (expected 'present' or 'absent')"
            )),
        }
    }
}

/// The single remote operation a reconcile decides on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Update,
    Delete,
    Noop,
}

impl Action {
    /// Whether this action issues a mutating call
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Self::Noop)
    }

    /// Verb used in operator-facing messages
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Noop => "keep",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Noop => write!(f, "none"),
            other => write!(f, "{}", other.verb()),
        }
    }
}

/// Result handed back to the invocation shell
///
/// `changed` is true only when a create, update or delete call was issued
/// and succeeded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconcileResult {
    pub changed: bool,
    pub action: Action,
    pub resource: Option<Resource>,
}

impl ReconcileResult {
    /// A reconcile that issued no mutating call
    pub fn unchanged(resource: Option<Resource>) -> Self {
        Self {
            changed: false,
            action: Action::Noop,
            resource,
        }
    }

    /// A reconcile whose mutating call succeeded
    pub fn changed(action: Action, resource: Option<Resource>) -> Self {
        Self {
            changed: action.is_mutation(),
            action,
            resource,
        }
    }
}
