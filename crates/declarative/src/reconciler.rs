//! Reconciler - converges one remote resource to its desired state
//!
//! Every kind goes through the same steps: resolve the lookup key, find the
//! current record, then issue at most one create, update or delete.

use crate::client::ResourceClient;
use crate::descriptor::{Descriptor, Resolved};
use crate::diff::{Drift, detect_drift, summarize};
use crate::error::{Operation, ReconcileError, Result};
use crate::kind::Kind;
use crate::types::{Action, LookupKey, ReconcileResult, Resource, Target};
use serde::Serialize;

/// What to do when a present resource's attributes differ from the desired ones
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DriftPolicy {
    /// Report drift and leave the resource alone
    #[default]
    Ignore,
    /// Issue an update carrying the desired attributes
    Correct,
}

/// The decision a reconcile would act on
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plan {
    pub kind: Kind,
    pub key: LookupKey,
    pub target: Target,
    pub action: Action,
    /// Record found by the primary lookup
    pub found: Option<Resource>,
    /// Attribute differences, only computed for present resources
    pub drift: Vec<Drift>,
}

impl Plan {
    /// Whether executing this plan would issue a mutating call
    pub fn would_change(&self) -> bool {
        self.action.is_mutation()
    }
}

/// Runs the reconcile algorithm against an explicit client
///
/// Holds no state between calls; each call is independent.
pub struct Reconciler<'a> {
    client: &'a dyn ResourceClient,
    drift_policy: DriftPolicy,
}

impl<'a> Reconciler<'a> {
    pub fn new(client: &'a dyn ResourceClient) -> Self {
        Self {
            client,
            drift_policy: DriftPolicy::default(),
        }
    }

    pub fn with_drift_policy(mut self, drift_policy: DriftPolicy) -> Self {
        self.drift_policy = drift_policy;
        self
    }

    /// Decide the action without mutating anything
    ///
    /// Issues only reads: the dependent lookups and the primary `find`.
    pub fn plan<D: Descriptor + ?Sized>(&self, descriptor: &D, target: Target) -> Result<Plan> {
        descriptor.validate()?;
        let Resolved { kind, key } = descriptor.resolve(self.client)?;

        log::debug!("Looking up {kind} {key}");
        let found = self
            .client
            .find(kind, &key)
            .map_err(|e| ReconcileError::remote(Operation::Get, kind, e))?
            .into_option();

        let mut drift = Vec::new();
        let action = match (&found, target) {
            (None, Target::Present) => Action::Create,
            (Some(_), Target::Absent) => Action::Delete,
            (None, Target::Absent) => Action::Noop,
            (Some(resource), Target::Present) => {
                drift = detect_drift(
                    resource,
                    &descriptor.desired_attributes(),
                    descriptor.write_only(),
                );
                match (drift.is_empty(), self.drift_policy) {
                    (true, _) => Action::Noop,
                    (false, DriftPolicy::Correct) => Action::Update,
                    (false, DriftPolicy::Ignore) => {
                        log::warn!(
                            "{kind} {key} differs from the desired state ({}); leaving it unchanged",
                            summarize(&drift)
                        );
                        Action::Noop
                    }
                }
            }
        };

        Ok(Plan {
            kind,
            key,
            target,
            action,
            found,
            drift,
        })
    }

    /// Converge the remote resource to `target`
    ///
    /// Returns `changed = true` only when the mutating call succeeded. A
    /// failure aborts immediately; whatever the server committed stays.
    pub fn reconcile<D: Descriptor + ?Sized>(
        &self,
        descriptor: &D,
        target: Target,
    ) -> Result<ReconcileResult> {
        let plan = self.plan(descriptor, target)?;
        self.execute(descriptor, plan)
    }

    /// Issue the single mutating call a plan decided on
    pub fn execute<D: Descriptor + ?Sized>(
        &self,
        descriptor: &D,
        plan: Plan,
    ) -> Result<ReconcileResult> {
        let Plan {
            kind,
            key,
            action,
            found,
            ..
        } = plan;

        match (action, found) {
            (Action::Create, _) => {
                let attributes = descriptor.create_attributes(&Resolved::new(kind, key.clone()));
                let created = self
                    .client
                    .create(kind, &attributes)
                    .map_err(|e| ReconcileError::remote(Operation::Create, kind, e))?;
                log::info!("Created {kind} {key} (id {})", created.id);
                Ok(ReconcileResult::changed(Action::Create, Some(created)))
            }
            (Action::Update, Some(current)) => {
                let attributes = descriptor.create_attributes(&Resolved::new(kind, key.clone()));
                let updated = self
                    .client
                    .update(kind, current.id, &attributes)
                    .map_err(|e| ReconcileError::remote(Operation::Update, kind, e))?;
                log::info!("Updated {kind} {key} (id {})", current.id);
                Ok(ReconcileResult::changed(Action::Update, Some(updated)))
            }
            (Action::Delete, Some(current)) => {
                let snapshot = self
                    .client
                    .delete(kind, current.id)
                    .map_err(|e| ReconcileError::remote(Operation::Delete, kind, e))?;
                log::info!("Deleted {kind} {key} (id {})", current.id);
                Ok(ReconcileResult::changed(
                    Action::Delete,
                    Some(snapshot.unwrap_or(current)),
                ))
            }
            (_, found) => Ok(ReconcileResult::unchanged(found)),
        }
    }
}
