//! Bearer credential issued by the backend.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// An opaque bearer token.
///
/// The client never inspects the token contents. `Debug` output is redacted
/// so credentials do not leak into logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    /// Creates a credential from a raw token string.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is empty or only whitespace.
    pub fn new(token: impl Into<String>) -> DomainResult<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(DomainError::InvalidCredential("token is empty".to_string()));
        }
        Ok(Self(token))
    }

    /// Returns the raw token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the value for an `Authorization` header.
    #[must_use]
    pub fn bearer_value(&self) -> String {
        format!("Bearer {}", self.0)
    }

    /// Consumes the credential and returns the raw token.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_token_rejected() {
        assert!(Credential::new("").is_err());
        assert!(Credential::new("   ").is_err());
    }

    #[test]
    fn test_bearer_value() {
        let credential = Credential::new("t1").unwrap();
        assert_eq!(credential.bearer_value(), "Bearer t1");
        assert_eq!(credential.as_str(), "t1");
    }

    #[test]
    fn test_debug_is_redacted() {
        let credential = Credential::new("super-secret").unwrap();
        let debug = format!("{credential:?}");
        assert!(!debug.contains("super-secret"));
    }
}
