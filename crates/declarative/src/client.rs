//! Resource client trait
//!
//! The reconciler talks to the remote system only through this trait, so
//! it can run against the real API or an in-memory fake.

use crate::error::{ApiError, ErrorCategory};
use crate::kind::Kind;
use crate::types::{Attributes, Lookup, LookupKey, Resource, ResourceId};

/// Authenticated access to a remote management API
///
/// One call is one synchronous round trip. Implementations report every
/// failure as an [`ApiError`]; none of them retry.
pub trait ResourceClient {
    /// List candidate records of a kind
    ///
    /// `hint` lets the implementation narrow the query server-side (e.g. by
    /// `name`). Callers must still filter the answer with [`LookupKey::matches`].
    fn list(&self, kind: Kind, hint: &LookupKey) -> Result<Vec<Resource>, ApiError>;

    /// Create a record and return it as stored
    fn create(&self, kind: Kind, attributes: &Attributes) -> Result<Resource, ApiError>;

    /// Overwrite attributes of an existing record
    fn update(
        &self,
        kind: Kind,
        id: ResourceId,
        attributes: &Attributes,
    ) -> Result<Resource, ApiError>;

    /// Delete a record
    ///
    /// Returns the server's snapshot of the deleted record, or `None` when
    /// the server answered without a body.
    fn delete(&self, kind: Kind, id: ResourceId) -> Result<Option<Resource>, ApiError>;

    /// Find the one record matching `key`
    ///
    /// Zero matches is [`Lookup::Absent`]; more than one is an
    /// [`ErrorCategory::Ambiguous`] error rather than a silent first pick.
    fn find(&self, kind: Kind, key: &LookupKey) -> Result<Lookup, ApiError> {
        select_one(kind, key, self.list(kind, key)?)
    }
}

/// Narrow candidates down to the single record matching `key`
pub fn select_one(
    kind: Kind,
    key: &LookupKey,
    candidates: Vec<Resource>,
) -> Result<Lookup, ApiError> {
    let mut matches: Vec<Resource> = candidates
        .into_iter()
        .filter(|candidate| key.matches(candidate))
        .collect();

    match matches.len() {
        0 => Ok(Lookup::Absent),
        1 => Ok(Lookup::Found(matches.remove(0))),
        n => Err(ApiError::new(
            ErrorCategory::Ambiguous,
            format!("{n} {} records match {key}", kind.label()),
        )),
    }
}

impl<C: ResourceClient + ?Sized> ResourceClient for &C {
    fn list(&self, kind: Kind, hint: &LookupKey) -> Result<Vec<Resource>, ApiError> {
        (**self).list(kind, hint)
    }

    fn create(&self, kind: Kind, attributes: &Attributes) -> Result<Resource, ApiError> {
        (**self).create(kind, attributes)
    }

    fn update(
        &self,
        kind: Kind,
        id: ResourceId,
        attributes: &Attributes,
    ) -> Result<Resource, ApiError> {
        (**self).update(kind, id, attributes)
    }

    fn delete(&self, kind: Kind, id: ResourceId) -> Result<Option<Resource>, ApiError> {
        (**self).delete(kind, id)
    }

    fn find(&self, kind: Kind, key: &LookupKey) -> Result<Lookup, ApiError> {
        (**self).find(kind, key)
    }
}
