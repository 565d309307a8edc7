//! Resource subcommands: build the descriptor, reconcile, report
//!
//! Every kind runs the same way. Only the descriptor differs.

use anyhow::{Context as _, Result};
use declarative::{
    Action, Descriptor, Drift, DriftPolicy, Kind, LookupKey, Plan, ReconcileError,
    ReconcileResult, Reconciler, Resource, ResourceClient, Target,
};
use foreman::ForemanClient;
use serde_json::{Map, Value, json};
use std::fs;

use crate::Context;
use crate::cli::{
    ComputeResourceArgs, EnsureArgs, OsDefaultTemplateArgs, OutputFormat, PtableArgs, RoleArgs,
};
use crate::resource::{ComputeResource, OsDefaultTemplate, PartitionTable, Role};
use crate::ui;

/// What one resource subcommand did, or would do in check mode
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub kind: Kind,
    pub key: LookupKey,
    pub target: Target,
    pub changed: bool,
    pub action: Action,
    pub resource: Option<Resource>,
    pub drift: Vec<Drift>,
    /// Planned only, nothing was sent
    pub check: bool,
}

impl Report {
    fn planned(plan: Plan) -> Self {
        Self {
            kind: plan.kind,
            key: plan.key,
            target: plan.target,
            changed: false,
            action: plan.action,
            resource: plan.found,
            drift: plan.drift,
            check: true,
        }
    }

    fn applied(
        kind: Kind,
        key: LookupKey,
        target: Target,
        drift: Vec<Drift>,
        result: ReconcileResult,
    ) -> Self {
        Self {
            kind,
            key,
            target,
            changed: result.changed,
            action: result.action,
            resource: result.resource,
            drift,
            check: false,
        }
    }

    /// Whether applying would issue a mutating call
    pub fn would_change(&self) -> bool {
        self.action.is_mutation()
    }

    /// `{"changed": .., "<kind>": resource|null}`, plus the plan in check mode
    pub fn to_json(&self) -> Value {
        let mut out = Map::new();
        out.insert("changed".into(), json!(self.changed));
        out.insert(self.kind.key().into(), json!(self.resource));
        if self.check {
            out.insert("would_change".into(), json!(self.would_change()));
            out.insert("action".into(), json!(self.action));
        }
        if !self.drift.is_empty() {
            out.insert("drift".into(), json!(self.drift));
        }
        Value::Object(out)
    }
}

/// Reconcile one descriptor against `client`
///
/// In check mode only the plan is computed and nothing is sent.
pub fn ensure<D: Descriptor + ?Sized>(
    client: &dyn ResourceClient,
    descriptor: &D,
    args: &EnsureArgs,
) -> Result<Report, ReconcileError> {
    let policy = if args.correct_drift {
        DriftPolicy::Correct
    } else {
        DriftPolicy::Ignore
    };
    let reconciler = Reconciler::new(client).with_drift_policy(policy);

    let plan = reconciler.plan(descriptor, args.state.into())?;
    if args.check {
        return Ok(Report::planned(plan));
    }

    let (kind, key, target) = (plan.kind, plan.key.clone(), plan.target);
    let drift = plan.drift.clone();
    let result = reconciler.execute(descriptor, plan)?;
    Ok(Report::applied(kind, key, target, drift, result))
}

/// Connect to Foreman, reconcile and print the report
fn run<D: Descriptor + ?Sized>(ctx: &Context, descriptor: &D, args: &EnsureArgs) -> Result<()> {
    let options = ctx.settings()?.into_options()?;
    let client = ForemanClient::new(&options)?;
    log::debug!("Reconciling {descriptor:?} against {}", client.base_url());

    let report = ensure(&client, descriptor, args)?;
    if ctx.quiet && ctx.output == OutputFormat::Text && !report.changed {
        return Ok(());
    }
    ui::report(ctx.output, &report);
    Ok(())
}

pub fn compute_resource(ctx: &Context, args: ComputeResourceArgs) -> Result<()> {
    let descriptor = ComputeResource {
        name: args.name,
        provider: args.provider,
        url: args.url,
        user: args.user,
        password: args.password,
        server: args.server,
        datacenter: args.datacenter,
    };
    run(ctx, &descriptor, &args.ensure)
}

pub fn os_default_template(ctx: &Context, args: OsDefaultTemplateArgs) -> Result<()> {
    let descriptor =
        OsDefaultTemplate::new(args.operatingsystem, args.config_template, args.template_kind);
    run(ctx, &descriptor, &args.ensure)
}

pub fn ptable(ctx: &Context, args: PtableArgs) -> Result<()> {
    let descriptor = partition_table(args.name, args.layout, args.layout_file.as_deref())?;
    run(ctx, &descriptor, &args.ensure)
}

pub fn role(ctx: &Context, args: RoleArgs) -> Result<()> {
    run(ctx, &Role::new(args.name), &args.ensure)
}

/// Partition table with its layout taken inline or from a file
fn partition_table(
    name: String,
    layout: Option<String>,
    layout_file: Option<&std::path::Path>,
) -> Result<PartitionTable> {
    let layout = match layout_file {
        Some(path) => Some(
            fs::read_to_string(path)
                .with_context(|| format!("Could not read layout file {}", path.display()))?,
        ),
        None => layout,
    };
    Ok(PartitionTable::new(name, layout))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::StateArg;
    use declarative::{Call, MemoryClient};
    use tempfile::TempDir;

    fn args(state: StateArg) -> EnsureArgs {
        EnsureArgs {
            state,
            check: false,
            correct_drift: false,
        }
    }

    #[test]
    fn test_ensure_reports_created_role() {
        let client = MemoryClient::new();
        let report = ensure(&client, &Role::new("MyRole"), &args(StateArg::Present)).unwrap();

        assert!(report.changed);
        assert!(!report.check);
        let json = report.to_json();
        assert_eq!(json["changed"], json!(true));
        assert_eq!(json["role"]["name"], json!("MyRole"));
        assert!(json.get("would_change").is_none());
    }

    #[test]
    fn test_absent_report_has_null_resource() {
        let client = MemoryClient::new();
        let report = ensure(&client, &Role::new("MyRole"), &args(StateArg::Absent)).unwrap();

        assert_eq!(report.to_json(), json!({"changed": false, "role": null}));
    }

    #[test]
    fn test_check_mode_sends_nothing() {
        let client = MemoryClient::new();
        client.seed(Kind::Role, [("name", "MyRole")]);
        let check = EnsureArgs {
            check: true,
            ..args(StateArg::Absent)
        };

        let report = ensure(&client, &Role::new("MyRole"), &check).unwrap();

        assert!(!report.changed);
        assert!(report.would_change());
        assert_eq!(report.action, Action::Delete);
        assert!(client.mutations().is_empty());
        assert_eq!(client.resources(Kind::Role).len(), 1);

        let json = report.to_json();
        assert_eq!(json["would_change"], json!(true));
        assert_eq!(json["action"], json!("delete"));
    }

    #[test]
    fn test_drift_is_reported_but_not_corrected() {
        let client = MemoryClient::new();
        client.seed(
            Kind::PartitionTable,
            [("name", json!("FreeBSD")), ("layout", json!("autopart"))],
        );
        let table = PartitionTable::new("FreeBSD", Some("zerombr".into()));

        let report = ensure(&client, &table, &args(StateArg::Present)).unwrap();

        assert!(!report.changed);
        assert_eq!(report.drift.len(), 1);
        assert_eq!(report.to_json()["drift"][0]["field"], json!("layout"));
        assert!(client.mutations().is_empty());
    }

    #[test]
    fn test_correct_drift_updates() {
        let client = MemoryClient::new();
        let seeded = client.seed(
            Kind::PartitionTable,
            [("name", json!("FreeBSD")), ("layout", json!("autopart"))],
        );
        let table = PartitionTable::new("FreeBSD", Some("zerombr".into()));
        let correct = EnsureArgs {
            correct_drift: true,
            ..args(StateArg::Present)
        };

        let report = ensure(&client, &table, &correct).unwrap();

        assert!(report.changed);
        assert_eq!(report.action, Action::Update);
        assert!(matches!(
            client.mutations().as_slice(),
            [Call::Update { id, .. }] if *id == seeded.id
        ));
    }

    #[test]
    fn test_deleted_binding_reported_under_its_key() {
        let client = MemoryClient::new();
        let os = client.seed(Kind::OperatingSystem, [("name", json!("CoreOS"))]);
        let template = client.seed(
            Kind::ConfigTemplate,
            [
                ("name", json!("CoreOS PXELinux")),
                ("template_kind_name", json!("PXELinux")),
                ("template_kind_id", json!(1)),
            ],
        );
        client.seed(
            Kind::OsDefaultTemplate {
                operatingsystem_id: os.id,
            },
            [
                ("config_template_id", json!(template.id.0)),
                ("template_kind_id", json!(1)),
            ],
        );
        let binding = OsDefaultTemplate::new("CoreOS", "CoreOS PXELinux", "PXELinux");

        let report = ensure(&client, &binding, &args(StateArg::Absent)).unwrap();

        let json = report.to_json();
        assert_eq!(json["changed"], json!(true));
        assert_eq!(json["os_default_template"]["id"], json!(3));
    }

    #[test]
    fn test_partition_table_layout_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("freebsd.layout");
        fs::write(&path, "zerombr\nautopart\n").unwrap();

        let table = partition_table("FreeBSD".into(), None, Some(&path)).unwrap();
        assert_eq!(table.layout.as_deref(), Some("zerombr\nautopart\n"));

        let inline = partition_table("FreeBSD".into(), Some("autopart".into()), None).unwrap();
        assert_eq!(inline.layout.as_deref(), Some("autopart"));
    }

    #[test]
    fn test_missing_layout_file_is_error() {
        let temp = TempDir::new().unwrap();
        let err = partition_table("FreeBSD".into(), None, Some(&temp.path().join("nope")))
            .unwrap_err();
        assert!(err.to_string().contains("Could not read layout file"));
    }
}
