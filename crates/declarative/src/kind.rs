//! Resource kinds used to route client calls

use crate::types::ResourceId;
use serde::Serialize;
use std::fmt;

/// Which collection on the remote system a call targets
///
/// The default-template binding lives under its operating system, so that
/// kind carries the parent id and every call on it is routed beneath it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Kind {
    ComputeResource,
    PartitionTable,
    Role,
    OperatingSystem,
    ConfigTemplate,
    OsDefaultTemplate { operatingsystem_id: ResourceId },
}

impl Kind {
    /// Machine name of the kind, also the key the result is reported under
    pub fn key(&self) -> &'static str {
        match self {
            Self::ComputeResource => "compute_resource",
            Self::PartitionTable => "ptable",
            Self::Role => "role",
            Self::OperatingSystem => "operatingsystem",
            Self::ConfigTemplate => "config_template",
            Self::OsDefaultTemplate { .. } => "os_default_template",
        }
    }

    /// Human-readable name for messages ("Could not create compute resource: ...")
    pub fn label(&self) -> &'static str {
        match self {
            Self::ComputeResource => "compute resource",
            Self::PartitionTable => "partition table",
            Self::Role => "role",
            Self::OperatingSystem => "operatingsystem",
            Self::ConfigTemplate => "config template",
            Self::OsDefaultTemplate { .. } => "operatingsystem default template",
        }
    }

    /// Parent resource the collection is nested under, if any
    pub fn parent(&self) -> Option<(Kind, ResourceId)> {
        match self {
            Self::OsDefaultTemplate { operatingsystem_id } => {
                Some((Self::OperatingSystem, *operatingsystem_id))
            }
            _ => None,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_labels() {
        assert_eq!(Kind::ComputeResource.to_string(), "compute resource");
        assert_eq!(Kind::PartitionTable.key(), "ptable");
        assert_eq!(
            Kind::OsDefaultTemplate {
                operatingsystem_id: ResourceId(3)
            }
            .key(),
            "os_default_template"
        );
    }

    #[test]
    fn test_kind_parent() {
        let kind = Kind::OsDefaultTemplate {
            operatingsystem_id: ResourceId(3),
        };
        assert_eq!(kind.parent(), Some((Kind::OperatingSystem, ResourceId(3))));
        assert_eq!(Kind::Role.parent(), None);
    }
}
