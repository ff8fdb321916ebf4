//! OAuth success callback handling.
//!
//! The backend finishes the provider handshake and redirects to
//! `/oauth-success?token=..&email=..&name=..`. The handler turns that location
//! into a session exactly once; later invocations are reported as
//! [`CallbackOutcome::AlreadyProcessed`] and have no side effects.

use std::sync::Arc;

use scm_domain::OAuthCallbackParams;
use tracing::{info, warn};

use crate::error::AuthResult;
use crate::ports::Navigator;
use crate::session::manager::AuthSessionManager;

/// Result of handling a callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// A session was established and the landing page opened.
    SignedIn {
        /// Email of the signed-in account.
        email: String,
    },
    /// The callback carried no usable session; the login page was opened.
    Rejected,
    /// This handler already processed a callback.
    AlreadyProcessed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Progress {
    Pending,
    Processed,
}

/// One-shot handler for an OAuth success callback.
pub struct OAuthCallbackHandler {
    manager: Arc<AuthSessionManager>,
    navigator: Arc<dyn Navigator>,
    progress: Progress,
}

impl OAuthCallbackHandler {
    /// Creates a handler that has not processed anything yet.
    #[must_use]
    pub fn new(manager: Arc<AuthSessionManager>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            manager,
            navigator,
            progress: Progress::Pending,
        }
    }

    /// Returns true once a callback has been handled.
    #[must_use]
    pub fn is_processed(&self) -> bool {
        self.progress == Progress::Processed
    }

    /// Handles the callback location.
    ///
    /// The handler moves to the processed state before doing any work, so a
    /// failure part-way through is not retried by a second call.
    ///
    /// # Errors
    /// Returns an error if the location cannot be parsed or the session cannot
    /// be persisted. In both cases the login page is opened.
    pub async fn process(&mut self, location: &str) -> AuthResult<CallbackOutcome> {
        if std::mem::replace(&mut self.progress, Progress::Processed) == Progress::Processed {
            return Ok(CallbackOutcome::AlreadyProcessed);
        }

        let routes = &self.manager.settings().routes;
        let session = match OAuthCallbackParams::parse(location) {
            Ok(params) => params.session(),
            Err(e) => {
                self.go(&routes.login);
                return Err(e.into());
            }
        };

        let Some((credential, user)) = session else {
            warn!("OAuth callback carried no token or email");
            self.go(&routes.login);
            return Ok(CallbackOutcome::Rejected);
        };

        if let Err(e) = self.manager.store().save(&credential, &user).await {
            self.go(&routes.login);
            return Err(e.into());
        }

        let email = user.email.clone();
        self.manager.oauth_login(user);
        info!(%email, "OAuth callback processed");
        self.go(&routes.landing);
        Ok(CallbackOutcome::SignedIn { email })
    }

    fn go(&self, path: &str) {
        if let Err(e) = self.navigator.navigate(path, None) {
            warn!(error = %e, "Navigation after OAuth callback failed");
        }
    }
}
