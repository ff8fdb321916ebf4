//! Session user snapshot cached on the client.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Role tag granted to administrators by the backend.
pub const ADMIN_ROLE: &str = "ROLE_ADMIN";

/// How the account was created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AuthProvider {
    /// Local email/password account.
    SelfManaged,
    /// Google sign-in.
    Google,
    /// GitHub sign-in.
    Github,
    /// A provider this client does not know about.
    Other(String),
}

impl From<String> for AuthProvider {
    fn from(value: String) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "SELF" => Self::SelfManaged,
            "GOOGLE" => Self::Google,
            "GITHUB" => Self::Github,
            _ => Self::Other(value),
        }
    }
}

impl From<AuthProvider> for String {
    fn from(value: AuthProvider) -> Self {
        match value {
            AuthProvider::SelfManaged => "SELF".to_string(),
            AuthProvider::Google => "GOOGLE".to_string(),
            AuthProvider::Github => "GITHUB".to_string(),
            AuthProvider::Other(other) => other,
        }
    }
}

impl fmt::Display for AuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from(self.clone()))
    }
}

/// Snapshot of the authenticated user's profile and roles.
///
/// Field names follow the backend's camelCase JSON so the record can be
/// persisted and read back without translation. Unknown fields in backend
/// payloads are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    /// Login email; the user's identity.
    pub email: String,
    /// Display name. OAuth callbacks may omit it.
    #[serde(default)]
    pub name: Option<String>,
    /// Phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    /// Free-form profile text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    /// Profile picture URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_pic: Option<String>,
    /// Whether the email address has been verified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,
    /// Account provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<AuthProvider>,
    /// Role tags. Order carries no meaning.
    #[serde(default)]
    pub role_list: Vec<String>,
}

impl SessionUser {
    /// Creates a user with only an email and an optional name.
    #[must_use]
    pub fn new(email: impl Into<String>, name: Option<String>) -> Self {
        Self {
            email: email.into(),
            name,
            phone_number: None,
            about: None,
            profile_pic: None,
            email_verified: None,
            provider: None,
            role_list: Vec::new(),
        }
    }

    /// Sets the role tags.
    #[must_use]
    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.role_list = roles.into_iter().map(Into::into).collect();
        self
    }

    /// Returns true if the user holds the given role tag.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.role_list.iter().any(|r| r == role)
    }

    /// Returns true if the user holds [`ADMIN_ROLE`].
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.has_role(ADMIN_ROLE)
    }

    /// Returns a copy with identity fields taken from a server confirmation.
    ///
    /// Missing or blank values keep the cached ones; roles and profile fields
    /// are never dropped.
    #[must_use]
    pub fn refreshed(&self, email: Option<&str>, name: Option<&str>) -> Self {
        let mut user = self.clone();
        if let Some(email) = email.filter(|e| !e.trim().is_empty()) {
            user.email = email.to_string();
        }
        if let Some(name) = name.filter(|n| !n.trim().is_empty()) {
            user.name = Some(name.to_string());
        }
        user
    }

    /// Checks the invariants a persisted user must satisfy.
    ///
    /// # Errors
    ///
    /// Returns an error if the email is blank or not an address.
    pub fn validate(&self) -> DomainResult<()> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(DomainError::InvalidUser("email is empty".to_string()));
        }
        if !email.contains('@') {
            return Err(DomainError::InvalidUser(format!(
                "email is not an address: {email}"
            )));
        }
        Ok(())
    }

    /// Parses and validates a user from its stored JSON form.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the record is invalid.
    pub fn from_json(json: &str) -> DomainResult<Self> {
        let user: Self =
            serde_json::from_str(json).map_err(|e| DomainError::Serialization(e.to_string()))?;
        user.validate()?;
        Ok(user)
    }

    /// Serializes the user for storage.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> DomainResult<String> {
        serde_json::to_string(self).map_err(|e| DomainError::Serialization(e.to_string()))
    }
}
