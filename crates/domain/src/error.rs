//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation or parsing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The credential is empty or blank.
    #[error("invalid credential: {0}")]
    InvalidCredential(String),

    /// A session user record failed validation.
    #[error("invalid session user: {0}")]
    InvalidUser(String),

    /// The provided URL is invalid or malformed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// A value could not be serialized or deserialized.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
