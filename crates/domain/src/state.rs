//! Authentication state published to guards and views.
//!
//! The state machine is:
//! - `initial()`: unauthenticated and loading, before restoration finishes
//! - `Unauthenticated`: no usable credential
//! - `Authenticated`: a credential is held for the contained user
//!
//! A user can only be reached through `Authenticated`, so "authenticated
//! without a user" cannot be represented.

use serde::{Deserialize, Serialize};

use crate::user::SessionUser;

/// Whether a user is signed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SessionStatus {
    /// No user is signed in.
    #[default]
    Unauthenticated,

    /// A user is signed in.
    Authenticated {
        /// The signed-in user.
        user: SessionUser,
    },
}

/// Snapshot of the session as seen by guards and views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthState {
    status: SessionStatus,
    loading: bool,
}

impl AuthState {
    /// State at process start: nothing known yet, restoration pending.
    #[must_use]
    pub const fn initial() -> Self {
        Self {
            status: SessionStatus::Unauthenticated,
            loading: true,
        }
    }

    /// Settled, signed-out state.
    #[must_use]
    pub const fn unauthenticated() -> Self {
        Self {
            status: SessionStatus::Unauthenticated,
            loading: false,
        }
    }

    /// Settled, signed-in state.
    #[must_use]
    pub const fn authenticated(user: SessionUser) -> Self {
        Self {
            status: SessionStatus::Authenticated { user },
            loading: false,
        }
    }

    /// Returns the session status.
    #[must_use]
    pub const fn status(&self) -> &SessionStatus {
        &self.status
    }

    /// Returns true if a user is signed in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self.status, SessionStatus::Authenticated { .. })
    }

    /// Returns true while restoration or a login call is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Returns the signed-in user, if any.
    #[must_use]
    pub const fn user(&self) -> Option<&SessionUser> {
        match &self.status {
            SessionStatus::Authenticated { user } => Some(user),
            SessionStatus::Unauthenticated => None,
        }
    }

    /// Marks the state as loading or settled without touching the status.
    pub const fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Replaces the signed-in user.
    ///
    /// Returns false, leaving the state untouched, when nobody is signed in.
    pub fn replace_user(&mut self, user: SessionUser) -> bool {
        match &mut self.status {
            SessionStatus::Authenticated { user: current } => {
                *current = user;
                true
            }
            SessionStatus::Unauthenticated => false,
        }
    }
}

impl Default for AuthState {
    fn default() -> Self {
        Self::initial()
    }
}
