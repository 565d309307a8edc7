//! Operating system default template descriptor
//!
//! The managed resource is the binding between an operating system, a
//! config template and a template kind, not the template itself. Both names
//! are turned into ids through read-only lookups before the binding is
//! searched under its operating system:
//!
//! 1. operatingsystem name -> operatingsystem id
//! 2. config template name + template kind name -> template id, kind id
//! 3. bindings of that operatingsystem, matched on both ids

use declarative::descriptor::require;
use declarative::{
    Attributes, Dependency, Descriptor, Kind, LookupKey, Operation, ReconcileError, Resolved,
    ResourceClient, Result,
};

/// Which config template an operating system uses for a template kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsDefaultTemplate {
    /// Operating system name, e.g. `CoreOS`
    pub operatingsystem: String,
    /// Config template name, e.g. `CoreOS PXELinux`
    pub config_template: String,
    /// Template kind name, e.g. `PXELinux`
    pub template_kind: String,
}

impl OsDefaultTemplate {
    pub fn new(
        operatingsystem: impl Into<String>,
        config_template: impl Into<String>,
        template_kind: impl Into<String>,
    ) -> Self {
        Self {
            operatingsystem: operatingsystem.into(),
            config_template: config_template.into(),
            template_kind: template_kind.into(),
        }
    }
}

impl Descriptor for OsDefaultTemplate {
    fn kind_label(&self) -> &'static str {
        "operatingsystem default template"
    }

    fn validate(&self) -> Result<()> {
        require("operatingsystem", &self.operatingsystem)?;
        require("config_template", &self.config_template)?;
        require("template_kind", &self.template_kind)
    }

    fn resolve(&self, client: &dyn ResourceClient) -> Result<Resolved> {
        let os = Dependency {
            kind: Kind::OperatingSystem,
            key: LookupKey::by_name(&self.operatingsystem),
            subject: "operatingsystem",
            operation: Operation::Search,
            missing: format!("Operatingsystem {} not found", self.operatingsystem),
        }
        .resolve(client)?;

        let template = Dependency {
            kind: Kind::ConfigTemplate,
            key: LookupKey::by_name(&self.config_template)
                .with("template_kind_name", self.template_kind.as_str()),
            subject: "config templates",
            operation: Operation::Get,
            missing: format!(
                "Could not find config template {} of kind {}",
                self.config_template, self.template_kind
            ),
        }
        .resolve(client)?;

        let template_kind_id = template.get_id("template_kind_id").ok_or_else(|| {
            ReconcileError::LookupFailed(format!(
                "Config template {} (id {}) carries no template_kind_id",
                self.config_template, template.id
            ))
        })?;

        Ok(Resolved::new(
            Kind::OsDefaultTemplate {
                operatingsystem_id: os.id,
            },
            LookupKey::new()
                .with("config_template_id", template.id.0)
                .with("template_kind_id", template_kind_id.0),
        ))
    }

    fn desired_attributes(&self) -> Attributes {
        Attributes::new()
    }
}
