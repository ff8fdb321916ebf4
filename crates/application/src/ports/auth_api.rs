//! Backend authentication and profile ports.

use std::fmt;

use async_trait::async_trait;
use scm_domain::{Credential, DomainResult, SessionUser};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Body of `POST /api/auth/login`.
#[derive(Clone, Serialize)]
pub struct LoginRequest {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
}

impl LoginRequest {
    /// Creates a login request.
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Payload returned by the login and validate endpoints.
///
/// Every field is optional on the wire; error responses reuse the same shape
/// with only `message` set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Issued or confirmed token.
    #[serde(default)]
    pub token: Option<String>,
    /// Token scheme, normally `Bearer`.
    #[serde(default, rename = "type")]
    pub token_type: Option<String>,
    /// Account email.
    #[serde(default)]
    pub email: Option<String>,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Human-readable status text.
    #[serde(default)]
    pub message: Option<String>,
    /// Role tags. The validate endpoint omits them.
    #[serde(default)]
    pub roles: Option<Vec<String>>,
}

impl AuthResponse {
    /// Returns the token as a credential, if one was issued.
    #[must_use]
    pub fn credential(&self) -> Option<Credential> {
        self.token.clone().and_then(|t| Credential::new(t).ok())
    }

    /// Builds the session user a login response describes.
    ///
    /// # Errors
    ///
    /// Returns an error if the response lacks a usable email.
    pub fn session_user(&self) -> DomainResult<SessionUser> {
        let user = SessionUser::new(self.email.clone().unwrap_or_default(), self.name.clone())
            .with_roles(self.roles.clone().unwrap_or_default());
        user.validate()?;
        Ok(user)
    }
}

/// Body of `PUT /api/user/profile`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    /// Display name.
    pub name: Option<String>,
    /// Free-form profile text.
    pub about: Option<String>,
    /// Phone number.
    pub phone_number: Option<String>,
    /// Profile picture URL. Blank values leave the current picture.
    pub profile_pic: Option<String>,
}

impl ProfileUpdate {
    /// Starts an update from the user's current profile.
    #[must_use]
    pub fn from_user(user: &SessionUser) -> Self {
        Self {
            name: user.name.clone(),
            about: user.about.clone(),
            phone_number: user.phone_number.clone(),
            profile_pic: user.profile_pic.clone(),
        }
    }
}

/// Backend authentication endpoints used by the session manager.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchanges an email and password for a token.
    ///
    /// # Errors
    /// Returns an error if the request fails or is rejected.
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError>;

    /// Asks the backend whether a token is still valid.
    ///
    /// # Errors
    /// Returns [`ApiError::Unauthorized`] when the token is rejected, and a
    /// transient variant when no verdict could be obtained.
    async fn validate(&self, credential: &Credential) -> Result<AuthResponse, ApiError>;
}

/// Backend profile endpoints for the signed-in user.
#[async_trait]
pub trait ProfileApi: Send + Sync {
    /// Fetches the signed-in user's profile.
    ///
    /// # Errors
    /// Returns an error if the request fails or is rejected.
    async fn fetch_profile(&self) -> Result<SessionUser, ApiError>;

    /// Updates the signed-in user's profile and returns the stored record.
    ///
    /// # Errors
    /// Returns an error if the request fails or is rejected.
    async fn update_profile(&self, update: &ProfileUpdate) -> Result<SessionUser, ApiError>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_login_response_wire_format() {
        let json = r#"{
            "token": "t1",
            "type": "Bearer",
            "email": "a@b.com",
            "name": "A",
            "message": "Login successful",
            "roles": ["ROLE_ADMIN"]
        }"#;
        let response: AuthResponse = serde_json::from_str(json).unwrap();

        assert_eq!(response.credential().unwrap().as_str(), "t1");
        assert_eq!(response.token_type.as_deref(), Some("Bearer"));

        let user = response.session_user().unwrap();
        assert_eq!(user.email, "a@b.com");
        assert_eq!(user.role_list, vec!["ROLE_ADMIN".to_string()]);
    }

    #[test]
    fn test_response_without_roles_yields_empty_role_list() {
        let response = AuthResponse {
            token: Some("t1".to_string()),
            email: Some("a@b.com".to_string()),
            ..AuthResponse::default()
        };
        assert!(response.session_user().unwrap().role_list.is_empty());
    }

    #[test]
    fn test_error_shape_has_no_credential() {
        let response: AuthResponse =
            serde_json::from_str(r#"{"token": null, "message": "Invalid token"}"#).unwrap();
        assert!(response.credential().is_none());
        assert!(response.session_user().is_err());
    }

    #[test]
    fn test_login_request_debug_hides_password() {
        let request = LoginRequest::new("a@b.com", "hunter2");
        assert!(!format!("{request:?}").contains("hunter2"));
    }

    #[test]
    fn test_profile_update_uses_camel_case() {
        let user = SessionUser {
            phone_number: Some("555".to_string()),
            ..SessionUser::new("a@b.com", Some("A".to_string()))
        };
        let json = serde_json::to_value(ProfileUpdate::from_user(&user)).unwrap();
        assert_eq!(json["phoneNumber"], "555");
        assert_eq!(json["name"], "A");
    }
}
