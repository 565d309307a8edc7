//! Attribute drift between a found resource and the desired state

use crate::types::{Attributes, Resource, values_equal};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// One attribute whose remote value differs from the desired one
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Drift {
    /// Attribute name
    pub field: String,
    /// Value on the remote record, `None` when the record lacks the field
    pub current: Option<Value>,
    /// Value the desired state asks for
    pub desired: Value,
}

impl fmt::Display for Drift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.current {
            Some(current) => write!(f, "{}: {} -> {}", self.field, current, self.desired),
            None => write!(f, "{}: (unset) -> {}", self.field, self.desired),
        }
    }
}

/// Compare desired attributes against a found resource
///
/// Null desired values mean "not specified" and are skipped, as are
/// `write_only` fields the API never echoes back (passwords).
pub fn detect_drift(found: &Resource, desired: &Attributes, write_only: &[&str]) -> Vec<Drift> {
    desired
        .iter()
        .filter(|(field, value)| !value.is_null() && !write_only.contains(&field.as_str()))
        .filter_map(|(field, value)| {
            let current = found.get(field);
            match current {
                Some(current) if values_equal(current, value) => None,
                _ => Some(Drift {
                    field: field.clone(),
                    current: current.cloned(),
                    desired: value.clone(),
                }),
            }
        })
        .collect()
}

/// Render drift as a comma-separated list for log lines
pub fn summarize(drift: &[Drift]) -> String {
    drift
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResourceId;
    use serde_json::json;

    fn ptable(layout: &str) -> Resource {
        let mut attributes = Attributes::new();
        attributes.insert("name".into(), json!("FreeBSD"));
        attributes.insert("layout".into(), json!(layout));
        Resource::new(ResourceId(3), attributes)
    }

    fn desired(fields: &[(&str, Value)]) -> Attributes {
        fields
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_no_drift_when_equal() {
        let found = ptable("zerombr");
        let want = desired(&[("name", json!("FreeBSD")), ("layout", json!("zerombr"))]);
        assert!(detect_drift(&found, &want, &[]).is_empty());
    }

    #[test]
    fn test_changed_field_is_reported() {
        let found = ptable("zerombr");
        let want = desired(&[("layout", json!("clearpart --all"))]);
        let drift = detect_drift(&found, &want, &[]);
        assert_eq!(drift.len(), 1);
        assert_eq!(drift[0].field, "layout");
        assert_eq!(drift[0].current, Some(json!("zerombr")));
        assert_eq!(drift[0].desired, json!("clearpart --all"));
    }

    #[test]
    fn test_missing_field_is_reported_as_unset() {
        let found = ptable("zerombr");
        let want = desired(&[("os_family", json!("FreeBSD"))]);
        let drift = detect_drift(&found, &want, &[]);
        assert_eq!(drift[0].current, None);
        assert_eq!(drift[0].to_string(), "os_family: (unset) -> \"FreeBSD\"");
    }

    #[test]
    fn test_null_and_write_only_fields_are_skipped() {
        let found = ptable("zerombr");
        let want = desired(&[("layout", Value::Null), ("password", json!("secret"))]);
        assert!(detect_drift(&found, &want, &["password"]).is_empty());
    }

    #[test]
    fn test_summarize() {
        let found = ptable("a");
        let want = desired(&[("layout", json!("b"))]);
        let drift = detect_drift(&found, &want, &[]);
        assert_eq!(summarize(&drift), "layout: \"a\" -> \"b\"");
    }
}
