//! Auth session manager.
//!
//! Single source of truth for "is the caller signed in, and as whom". One
//! instance is built at startup and handed to every consumer.
//!
//! State is published through a `watch` channel. Every operation finishes its
//! storage writes before publishing, and publishes exactly once per
//! transition, so readers never observe a half-applied update. Operations are
//! not fenced against each other: when a restoration and a login overlap, the
//! one that settles last determines the state.

use std::sync::Arc;

use scm_domain::{AuthState, FlashMessage, RouteConfig, SessionUser};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{ApiError, AuthError, AuthResult};
use crate::ports::{AuthApi, AuthResponse, LoginRequest, Navigator, SessionListener};
use crate::session::store::{SessionStore, StoredSession};

const LOGGED_OUT_MESSAGE: &str = "You have been logged out.";
const LOGOUT_COMPLETED_MESSAGE: &str = "Logout completed.";

/// Behavior knobs for the session manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// Keep the cached user signed in when validation fails for a transient
    /// reason. When false, such a failure leaves the session signed out but
    /// keeps the persisted entries for the next start.
    pub optimistic_restore: bool,
    /// Well-known locations.
    pub routes: RouteConfig,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            optimistic_restore: true,
            routes: RouteConfig::default(),
        }
    }
}

/// How [`AuthSessionManager::restore_session`] settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// Nothing was persisted; no request was made.
    NoSession,
    /// The persisted user record was unreadable and has been cleared.
    Discarded,
    /// The server confirmed the credential.
    Validated,
    /// The server rejected the credential; the session was cleared.
    Rejected,
    /// Validation failed transiently; the cached user was kept signed in.
    Degraded {
        /// The failure that was tolerated.
        error: ApiError,
    },
    /// Validation failed transiently and optimistic restore is disabled.
    Unverified {
        /// The failure that was tolerated.
        error: ApiError,
    },
    /// The storage could not be read.
    StorageUnavailable,
}

/// Owns the in-memory authentication state.
pub struct AuthSessionManager {
    store: SessionStore,
    api: Arc<dyn AuthApi>,
    navigator: Arc<dyn Navigator>,
    settings: SessionSettings,
    state: watch::Sender<AuthState>,
}

impl AuthSessionManager {
    /// Creates a manager in the initial loading state.
    #[must_use]
    pub fn new(
        store: SessionStore,
        api: Arc<dyn AuthApi>,
        navigator: Arc<dyn Navigator>,
        settings: SessionSettings,
    ) -> Self {
        let (state, _) = watch::channel(AuthState::initial());
        Self {
            store,
            api,
            navigator,
            settings,
            state,
        }
    }

    /// Returns a snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Subscribes to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// Waits until the state is no longer loading and returns it.
    pub async fn wait_until_settled(&self) -> AuthState {
        let mut receiver = self.state.subscribe();
        let settled = receiver
            .wait_for(|state| !state.is_loading())
            .await
            .map(|state| state.clone());
        // The sender lives in `self`, so the channel cannot close here.
        settled.unwrap_or_else(|_| self.state())
    }

    /// Returns the settings the manager was built with.
    #[must_use]
    pub const fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Returns the persisted session store.
    #[must_use]
    pub const fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Rebuilds the state from storage, validating the credential with the
    /// backend when one is persisted. Always settles `loading` to false.
    pub async fn restore_session(&self) -> RestoreOutcome {
        let stored = match self.store.load().await {
            Ok(stored) => stored,
            Err(e) => {
                warn!(error = %e, "Session storage unreadable, starting signed out");
                self.publish(AuthState::unauthenticated());
                return RestoreOutcome::StorageUnavailable;
            }
        };

        let (credential, user) = match stored {
            StoredSession::Empty => {
                debug!("No persisted session");
                self.publish(AuthState::unauthenticated());
                return RestoreOutcome::NoSession;
            }
            StoredSession::Corrupt { reason } => {
                warn!(%reason, "Persisted user is invalid, clearing session");
                self.clear_quietly().await;
                self.publish(AuthState::unauthenticated());
                return RestoreOutcome::Discarded;
            }
            StoredSession::Present { credential, user } => (credential, user),
        };

        match self.api.validate(&credential).await {
            Ok(response) if response.credential().is_some() => {
                let refreshed = user.refreshed(response.email.as_deref(), response.name.as_deref());
                if refreshed != user {
                    if let Err(e) = self.store.save_user(&refreshed).await {
                        warn!(error = %e, "Could not persist refreshed user");
                    }
                }
                info!(email = %refreshed.email, "Session restored");
                self.publish(AuthState::authenticated(refreshed));
                RestoreOutcome::Validated
            }
            Ok(_) => {
                warn!("Validation response carried no token, clearing session");
                self.clear_quietly().await;
                self.publish(AuthState::unauthenticated());
                RestoreOutcome::Rejected
            }
            Err(e) if e.is_unauthorized() => {
                info!("Persisted credential rejected, clearing session");
                self.clear_quietly().await;
                self.publish(AuthState::unauthenticated());
                RestoreOutcome::Rejected
            }
            Err(error) if self.settings.optimistic_restore => {
                warn!(%error, email = %user.email, "Could not validate session, keeping cached user");
                self.publish(AuthState::authenticated(user));
                RestoreOutcome::Degraded { error }
            }
            Err(error) => {
                warn!(%error, "Could not validate session, starting signed out");
                self.publish(AuthState::unauthenticated());
                RestoreOutcome::Unverified { error }
            }
        }
    }

    /// Signs in with an email and password.
    ///
    /// On success the credential and user are persisted and the server
    /// payload is returned. On any failure the state becomes signed out and
    /// the error is returned for display.
    ///
    /// # Errors
    /// Returns the backend error, [`AuthError::MissingToken`] when the server
    /// issued no token, or a storage error when the session cannot be saved.
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<AuthResponse> {
        self.state.send_modify(|state| state.set_loading(true));

        let request = LoginRequest::new(email, password);
        match self.exchange_credentials(&request).await {
            Ok((response, user)) => {
                info!(email = %user.email, "Signed in");
                self.publish(AuthState::authenticated(user));
                Ok(response)
            }
            Err(e) => {
                info!(error = %e, "Sign-in failed");
                self.publish(AuthState::unauthenticated());
                Err(e)
            }
        }
    }

    async fn exchange_credentials(
        &self,
        request: &LoginRequest,
    ) -> AuthResult<(AuthResponse, SessionUser)> {
        let response = self.api.login(request).await?;
        let credential = response.credential().ok_or(AuthError::MissingToken)?;
        let user = response.session_user()?;
        self.store.save(&credential, &user).await?;
        Ok((response, user))
    }

    /// Marks the session signed in for a user delivered by an OAuth callback.
    ///
    /// The caller persists the callback's credential and guarantees this runs
    /// at most once per callback.
    pub fn oauth_login(&self, user: SessionUser) {
        info!(email = %user.email, "Signed in through OAuth");
        self.publish(AuthState::authenticated(user));
    }

    /// Replaces the signed-in user and persists it. The credential is kept.
    ///
    /// # Errors
    /// Returns [`AuthError::NotAuthenticated`] when nobody is signed in, a
    /// domain error when the record is invalid, or a storage error.
    pub async fn update_user(&self, user: SessionUser) -> AuthResult<()> {
        user.validate()?;
        if !self.state.borrow().is_authenticated() {
            return Err(AuthError::NotAuthenticated);
        }

        self.store.save_user(&user).await?;
        debug!(email = %user.email, "Session user updated");
        self.state.send_if_modified(|state| state.replace_user(user));
        Ok(())
    }

    /// Signs out: clears storage, resets the state, and navigates to login.
    ///
    /// The state is signed out when this returns, whatever the storage or
    /// navigator did.
    pub async fn logout(&self) {
        let message = match self.store.clear().await {
            Ok(()) => FlashMessage::success(LOGGED_OUT_MESSAGE),
            Err(e) => {
                warn!(error = %e, "Could not clear persisted session during logout");
                FlashMessage::success(LOGOUT_COMPLETED_MESSAGE)
            }
        };
        self.publish(AuthState::unauthenticated());
        info!("Signed out");

        if let Err(e) = self.navigator.navigate(&self.settings.routes.login, Some(message)) {
            warn!(error = %e, "Navigation after logout failed");
        }
    }

    async fn clear_quietly(&self) {
        if let Err(e) = self.store.clear().await {
            warn!(error = %e, "Could not clear persisted session");
        }
    }

    fn publish(&self, state: AuthState) {
        debug!(
            authenticated = state.is_authenticated(),
            loading = state.is_loading(),
            "Auth state changed"
        );
        self.state.send_replace(state);
    }
}

impl SessionListener for AuthSessionManager {
    /// Signs the user out in memory. A restore or login still in flight keeps
    /// its `loading` flag and settles the state itself.
    fn session_invalidated(&self) {
        let changed = self.state.send_if_modified(|state| {
            if !state.is_authenticated() {
                return false;
            }
            let loading = state.is_loading();
            *state = AuthState::unauthenticated();
            state.set_loading(loading);
            true
        });
        if changed {
            info!("Session revoked by the server, signed out");
        }
    }
}
