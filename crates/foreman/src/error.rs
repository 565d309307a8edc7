//! Error types for Foreman API calls.
//!
//! [`Error`] describes what went wrong on the wire. The reconcile core only
//! knows [`ApiError`], so every error converts into one, keeping the HTTP
//! status and the server's own message.

use declarative::{ApiError, ErrorCategory};
use serde_json::Value;

/// Result type alias for Foreman client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to Foreman.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Connection settings are unusable.
    #[error("invalid connection settings: {0}")]
    InvalidConfig(String),

    /// No response arrived (DNS, TCP, TLS, timeout).
    #[error("{0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("{message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response body.
        message: String,
    },

    /// The response body was not what the API documents.
    #[error("invalid API response: {0}")]
    InvalidResponse(String),
}

impl Error {
    /// Create an HTTP error, pulling the message out of a Foreman error body.
    pub fn http(status: u16, body: &str) -> Self {
        Self::Http {
            status,
            message: error_message(status, body),
        }
    }

    /// HTTP status, if the server answered.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Get the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidConfig(_) => ErrorCategory::Other,
            Self::Transport(_) => ErrorCategory::Transport,
            Self::Http { status, .. } => ErrorCategory::from_status(*status),
            Self::InvalidResponse(_) => ErrorCategory::InvalidResponse,
        }
    }
}

/// Extract the human-readable message from a Foreman error body
///
/// Foreman answers `{"error": {"message": ...}}` for most failures and
/// `{"error": {"full_messages": [...]}}` for validation failures. Anything
/// else falls back to the raw body, then to the status line.
pub fn error_message(status: u16, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        let error = value.get("error").unwrap_or(&value);

        if let Some(messages) = error.get("full_messages").and_then(Value::as_array) {
            let joined: Vec<&str> = messages.iter().filter_map(Value::as_str).collect();
            if !joined.is_empty() {
                return joined.join(", ");
            }
        }
        if let Some(message) = error.get("message").and_then(Value::as_str) {
            return message.to_string();
        }
        if let Some(message) = error.as_str() {
            return message.to_string();
        }
    }

    let body = body.trim();
    if body.is_empty() || body.starts_with('<') {
        format!("HTTP {status}")
    } else {
        body.to_string()
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => Self::Http {
                status: code,
                message: format!("HTTP {code}"),
            },
            other => Self::Transport(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError {
            category: err.category(),
            status: err.status(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_from_message_body() {
        let body = r#"{"error":{"message":"Unable to authenticate user admin"}}"#;
        assert_eq!(error_message(401, body), "Unable to authenticate user admin");
    }

    #[test]
    fn test_error_message_from_validation_body() {
        let body = r#"{"error":{"id":null,"errors":{"name":["has already been taken"]},"full_messages":["Name has already been taken"]}}"#;
        assert_eq!(error_message(422, body), "Name has already been taken");
    }

    #[test]
    fn test_error_message_from_plain_text() {
        assert_eq!(error_message(500, "boom\n"), "boom");
    }

    #[test]
    fn test_error_message_falls_back_to_status() {
        assert_eq!(error_message(502, ""), "HTTP 502");
        assert_eq!(error_message(502, "<html>Bad Gateway</html>"), "HTTP 502");
    }

    #[test]
    fn test_http_error_category() {
        let err = Error::http(401, r#"{"error":{"message":"denied"}}"#);
        assert_eq!(err.category(), ErrorCategory::Authentication);
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.to_string(), "denied");
    }

    #[test]
    fn test_transport_error_category() {
        let err = Error::Transport("connection refused".to_string());
        assert_eq!(err.category(), ErrorCategory::Transport);
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_from_serde_error() {
        let serde_err = serde_json::from_str::<Value>("{").unwrap_err();
        let err: Error = serde_err.into();
        assert_eq!(err.category(), ErrorCategory::InvalidResponse);
    }

    #[test]
    fn test_into_api_error_keeps_status_and_message() {
        let err = Error::http(422, r#"{"error":{"full_messages":["Name has already been taken"]}}"#);
        let api: ApiError = err.into();
        assert_eq!(api.category, ErrorCategory::Conflict);
        assert_eq!(api.status, Some(422));
        assert_eq!(api.message, "Name has already been taken");
    }
}
