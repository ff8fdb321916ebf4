//! Navigation vocabulary shared by guards and navigators.

use serde::{Deserialize, Serialize};

use crate::user::ADMIN_ROLE;

/// Path of the login entry point.
pub const LOGIN_PATH: &str = "/login";

/// Default landing page for signed-in users.
pub const LANDING_PATH: &str = "/user/dashboard";

/// Path the backend redirects to after an OAuth handshake.
pub const OAUTH_CALLBACK_PATH: &str = "/oauth-success";

/// Well-known locations and the admin marker used by the guards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    /// Login entry point.
    pub login: String,
    /// Default landing page for signed-in users.
    pub landing: String,
    /// Role tag that grants access to admin routes.
    pub admin_role: String,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            login: LOGIN_PATH.to_string(),
            landing: LANDING_PATH.to_string(),
            admin_role: ADMIN_ROLE.to_string(),
        }
    }
}

/// Outcome of evaluating a guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session state is still loading; show a wait indicator.
    Wait,
    /// Render the protected route.
    Allow,
    /// Navigate elsewhere instead.
    Redirect {
        /// Target path.
        to: String,
    },
}

impl GuardDecision {
    /// Creates a redirect decision.
    #[must_use]
    pub fn redirect(to: impl Into<String>) -> Self {
        Self::Redirect { to: to.into() }
    }

    /// Returns true if the route may render.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Color tag for a flash message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Confirmation.
    Green,
    /// Failure.
    Red,
    /// Warning.
    Yellow,
}

/// One-shot message shown on the page navigated to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    /// Text to display.
    pub content: String,
    /// Color tag.
    #[serde(rename = "type")]
    pub kind: MessageKind,
}

impl FlashMessage {
    /// Creates a confirmation message.
    #[must_use]
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            kind: MessageKind::Green,
        }
    }

    /// Creates a failure message.
    #[must_use]
    pub fn error(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            kind: MessageKind::Red,
        }
    }
}
