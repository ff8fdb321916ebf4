//! Application error types

use std::collections::BTreeMap;

use scm_domain::DomainError;
use thiserror::Error;

use crate::ports::StorageError;

/// Failure talking to the backend.
///
/// The variants follow the session error taxonomy: `Unauthorized` is always
/// destructive, `Network`/`Timeout`/5xx are transient, `Validation` carries
/// field-level messages for inline display.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The server rejected the credential (HTTP 401).
    #[error("unauthorized")]
    Unauthorized {
        /// Server-provided explanation, if any.
        message: Option<String>,
    },

    /// The server rejected the submitted fields (HTTP 400/422).
    #[error("validation failed")]
    Validation {
        /// Server-provided summary, if any.
        message: Option<String>,
        /// Per-field messages keyed by field name.
        fields: BTreeMap<String, String>,
    },

    /// Any other non-success status.
    #[error("server responded with status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Server-provided explanation, if any.
        message: Option<String>,
    },

    /// No response was received.
    #[error("network error: {0}")]
    Network(String),

    /// The request timed out.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout {
        /// Timeout that elapsed, in milliseconds.
        timeout_ms: u64,
    },

    /// The response could not be understood.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// Returns true if the server explicitly rejected the credential.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Returns true if retrying later might succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout { .. } => true,
            Self::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns the server-provided message, if any.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Unauthorized { message }
            | Self::Validation { message, .. }
            | Self::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Returns text suitable for an inline error next to a form.
    #[must_use]
    pub fn user_message(&self) -> String {
        self.server_message()
            .map_or_else(|| self.to_string(), ToString::to_string)
    }
}

/// Errors returned by session operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The backend call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The backend accepted the request but issued no token.
    #[error("no token received")]
    MissingToken,

    /// The session could not be persisted.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// A record failed domain validation.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// The operation needs a signed-in user.
    #[error("no user is signed in")]
    NotAuthenticated,
}

impl AuthError {
    /// Returns text suitable for an inline error next to a form.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(error) => error.user_message(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for session operations.
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ApiError::Network("refused".to_string()).is_transient());
        assert!(ApiError::Timeout { timeout_ms: 10 }.is_transient());
        assert!(
            ApiError::Status {
                status: 503,
                message: None
            }
            .is_transient()
        );
        assert!(
            !ApiError::Status {
                status: 404,
                message: None
            }
            .is_transient()
        );
        assert!(!ApiError::Unauthorized { message: None }.is_transient());
    }

    #[test]
    fn test_user_message_prefers_server_text() {
        let error = ApiError::Unauthorized {
            message: Some("Invalid email or password".to_string()),
        };
        assert_eq!(error.user_message(), "Invalid email or password");
        assert_eq!(
            AuthError::from(error).user_message(),
            "Invalid email or password"
        );
        assert_eq!(
            ApiError::Network("connection refused".to_string()).user_message(),
            "network error: connection refused"
        );
    }
}
