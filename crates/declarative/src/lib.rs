//! # Declarative
//!
//! Reconciliation of remote resources against a declared desired state.
//!
//! A reconcile call resolves a resource's natural key, looks the resource up
//! on the remote system, and issues at most one create, update or delete to
//! make it match the wanted existence state. Running it again with the same
//! input changes nothing.
//!
//! ## Core Concepts
//!
//! - **Resource**: an identified record owned by the remote system
//! - **LookupKey**: the attributes that identify "the same" resource
//! - **Descriptor**: the desired state of one resource kind; computes the
//!   key (possibly through dependent lookups) and the create payload
//! - **ResourceClient**: the only door to the remote API
//! - **Reconciler**: the algorithm, shared by every kind
//!
//! ## Example
//!
//! ```
//! use declarative::{
//!     Attributes, Descriptor, Kind, LookupKey, MemoryClient, Reconciler, Resolved,
//!     ResourceClient, Result, Target,
//! };
//!
//! #[derive(Debug)]
//! struct Role {
//!     name: String,
//! }
//!
//! impl Descriptor for Role {
//!     fn kind_label(&self) -> &'static str {
//!         "role"
//!     }
//!     fn validate(&self) -> Result<()> {
//!         declarative::descriptor::require("name", &self.name)
//!     }
//!     fn resolve(&self, _client: &dyn ResourceClient) -> Result<Resolved> {
//!         Ok(Resolved::new(Kind::Role, LookupKey::by_name(&self.name)))
//!     }
//!     fn desired_attributes(&self) -> Attributes {
//!         Attributes::new()
//!     }
//! }
//!
//! let client = MemoryClient::new();
//! let reconciler = Reconciler::new(&client);
//! let role = Role { name: "MyRole".into() };
//!
//! assert!(reconciler.reconcile(&role, Target::Present)?.changed);
//! assert!(!reconciler.reconcile(&role, Target::Present)?.changed);
//! # Ok::<(), declarative::ReconcileError>(())
//! ```

pub mod client;
pub mod descriptor;
pub mod diff;
pub mod error;
pub mod kind;
pub mod memory;
pub mod reconciler;
pub mod types;

// Re-export main types at crate root
pub use client::ResourceClient;
pub use descriptor::{Dependency, Descriptor, Resolved};
pub use diff::{Drift, detect_drift};
pub use error::{ApiError, ErrorCategory, Operation, ReconcileError, Result};
pub use kind::Kind;
pub use memory::{Call, MemoryClient};
pub use reconciler::{DriftPolicy, Plan, Reconciler};
pub use types::{
    Action, Attributes, Lookup, LookupKey, ReconcileResult, Resource, ResourceId, Target,
};
