//! Error types for reconciliation.
//!
//! Two layers: [`ApiError`] is what a resource client reports for a single
//! remote call, and [`ReconcileError`] is what a reconcile call aborts with.
//! API errors are categorized so the invocation shell can give useful advice.

use crate::kind::Kind;
use std::fmt;

/// Result type alias for reconcile operations.
pub type Result<T> = std::result::Result<T, ReconcileError>;

/// Categories of remote API failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Connection, TLS or timeout failure before a response arrived.
    Transport,
    /// Credentials rejected (401/403).
    Authentication,
    /// Addressed record or collection does not exist (404).
    NotFound,
    /// Server refused the write, e.g. a duplicate name (409/422).
    Conflict,
    /// Server-side fault (5xx).
    Server,
    /// Response body could not be decoded.
    InvalidResponse,
    /// A lookup key matched more than one record.
    Ambiguous,
    /// Anything else.
    Other,
}

impl ErrorCategory {
    /// Map an HTTP status code to a category.
    #[must_use]
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::Authentication,
            404 => Self::NotFound,
            409 | 422 => Self::Conflict,
            500..=599 => Self::Server,
            _ => Self::Other,
        }
    }

    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Transport => "Could not reach the API",
            Self::Authentication => "Authentication failed",
            Self::NotFound => "Not found",
            Self::Conflict => "Rejected by the server",
            Self::Server => "Server error",
            Self::InvalidResponse => "Invalid API response",
            Self::Ambiguous => "Ambiguous lookup",
            Self::Other => "Unexpected error",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Transport => "Check the host, port and TLS settings, then run again",
            Self::Authentication => "Check the user name and password",
            Self::NotFound => "Check that the referenced records exist",
            Self::Conflict => "Inspect the server message; the record may already exist",
            Self::Server => "Check the server logs and run again",
            Self::InvalidResponse => "Check that the host serves the API v2",
            Self::Ambiguous => "Make the lookup key unique on the server",
            Self::Other => "Check the error details for more information",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// A failed call against the remote API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    /// What kind of failure this was.
    pub category: ErrorCategory,
    /// HTTP status, when a response arrived.
    pub status: Option<u16>,
    /// Detail text, surfaced to the operator verbatim.
    pub message: String,
}

impl ApiError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            status: None,
            message: message.into(),
        }
    }

    /// Build an error from an HTTP status and the server's message.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self {
            category: ErrorCategory::from_status(status),
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Transport, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::InvalidResponse, message)
    }

    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        self.category
    }
}

/// Operation a remote failure happened in, for error context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Get,
    Search,
    List,
    Create,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Self::Get => "get",
            Self::Search => "search",
            Self::List => "list",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        };
        write!(f, "{verb}")
    }
}

/// Why a reconcile call aborted.
///
/// Every variant is fatal; nothing is retried and nothing is rolled back.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReconcileError {
    /// The desired-state record failed validation before any remote call.
    #[error("{0}")]
    InvalidInput(String),

    /// A dependent lookup found nothing.
    #[error("{0}")]
    LookupFailed(String),

    /// A dependent lookup found more than one candidate.
    #[error("{0}")]
    LookupAmbiguous(String),

    /// A resource client call failed.
    #[error("Could not {operation} {subject}: {source}")]
    Remote {
        operation: Operation,
        /// Plural or singular noun phrase, e.g. "config templates".
        subject: String,
        #[source]
        source: ApiError,
    },
}

impl ReconcileError {
    /// Wrap a client failure with the operation and kind it happened in.
    pub fn remote(operation: Operation, kind: Kind, source: ApiError) -> Self {
        Self::Remote {
            operation,
            subject: kind.label().to_string(),
            source,
        }
    }

    /// Wrap a client failure with a free-form subject.
    pub fn remote_subject(
        operation: Operation,
        subject: impl Into<String>,
        source: ApiError,
    ) -> Self {
        Self::Remote {
            operation,
            subject: subject.into(),
            source,
        }
    }

    /// Whether a mutating call was attempted before this error.
    #[must_use]
    pub fn during_mutation(&self) -> bool {
        matches!(
            self,
            Self::Remote {
                operation: Operation::Create | Operation::Update | Operation::Delete,
                ..
            }
        )
    }

    /// Category of the underlying API failure, if any.
    #[must_use]
    pub fn api_category(&self) -> Option<ErrorCategory> {
        match self {
            Self::Remote { source, .. } => Some(source.category),
            _ => None,
        }
    }
}
