//! Guarded navigation.

use std::sync::Arc;

use scm_domain::GuardDecision;
use tracing::debug;

use crate::ports::{NavigationError, Navigator};
use crate::routing::guard::RouteTable;
use crate::session::AuthSessionManager;

/// Navigates through the route table, consulting the session on every move.
pub struct Router {
    manager: Arc<AuthSessionManager>,
    navigator: Arc<dyn Navigator>,
    table: RouteTable,
}

impl Router {
    /// Creates a router.
    #[must_use]
    pub fn new(
        manager: Arc<AuthSessionManager>,
        navigator: Arc<dyn Navigator>,
        table: RouteTable,
    ) -> Self {
        Self {
            manager,
            navigator,
            table,
        }
    }

    /// Evaluates the guard for `path` against the current state without
    /// navigating.
    #[must_use]
    pub fn check(&self, path: &str) -> GuardDecision {
        let settings = self.manager.settings();
        self.table
            .resolve(path)
            .evaluate(&self.manager.state(), &settings.routes)
    }

    /// Navigates to `path` if its guard allows it, or to the guard's redirect
    /// target otherwise. Nothing happens while the session is loading.
    ///
    /// # Errors
    /// Returns an error if the navigator fails.
    pub fn navigate(&self, path: &str) -> Result<GuardDecision, NavigationError> {
        let decision = self.check(path);
        debug!(%path, ?decision, "Route guard evaluated");
        match &decision {
            GuardDecision::Allow => self.navigator.navigate(path, None)?,
            GuardDecision::Redirect { to } => self.navigator.navigate(to, None)?,
            GuardDecision::Wait => {}
        }
        Ok(decision)
    }

    /// Waits for the session to settle, then navigates.
    ///
    /// # Errors
    /// Returns an error if the navigator fails.
    pub async fn navigate_when_settled(
        &self,
        path: &str,
    ) -> Result<GuardDecision, NavigationError> {
        self.manager.wait_until_settled().await;
        self.navigate(path)
    }
}
