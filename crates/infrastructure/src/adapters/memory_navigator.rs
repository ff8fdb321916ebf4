//! In-process navigator.
//!
//! Tracks the current location and every move made, which is all a headless
//! shell needs. The CLI renders the recorded flash message after a command.

use std::sync::{Mutex, MutexGuard, PoisonError};

use scm_application::{NavigationError, Navigator};
use scm_domain::FlashMessage;
use tracing::debug;

/// How a location change was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationKind {
    /// Client-side navigation.
    Navigate,
    /// Hard redirect that resets the view.
    Redirect,
}

/// One recorded location change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationEntry {
    /// Target path.
    pub path: String,
    /// Navigation or hard redirect.
    pub kind: NavigationKind,
    /// Message handed to the target page.
    pub flash: Option<FlashMessage>,
}

#[derive(Debug)]
struct Location {
    current: String,
    history: Vec<NavigationEntry>,
    flash: Option<FlashMessage>,
}

/// Navigator that keeps its location in memory.
#[derive(Debug)]
pub struct MemoryNavigator {
    inner: Mutex<Location>,
}

impl MemoryNavigator {
    /// Creates a navigator positioned at `start`.
    #[must_use]
    pub fn new(start: impl Into<String>) -> Self {
        Self {
            inner: Mutex::new(Location {
                current: start.into(),
                history: Vec::new(),
                flash: None,
            }),
        }
    }

    /// Returns every recorded move, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<NavigationEntry> {
        self.lock().history.clone()
    }

    /// Takes the pending flash message, if any.
    pub fn take_flash(&self) -> Option<FlashMessage> {
        self.lock().flash.take()
    }

    fn lock(&self) -> MutexGuard<'_, Location> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(
        &self,
        path: &str,
        kind: NavigationKind,
        flash: Option<FlashMessage>,
    ) -> Result<(), NavigationError> {
        if !path.starts_with('/') {
            return Err(NavigationError::Failed {
                path: path.to_string(),
                reason: "path must be absolute".to_string(),
            });
        }

        debug!(%path, ?kind, "Location changed");
        let mut location = self.lock();
        location.current = path.to_string();
        location.flash.clone_from(&flash);
        location.history.push(NavigationEntry {
            path: path.to_string(),
            kind,
            flash,
        });
        Ok(())
    }
}

impl Navigator for MemoryNavigator {
    fn current_path(&self) -> String {
        self.lock().current.clone()
    }

    fn navigate(&self, path: &str, flash: Option<FlashMessage>) -> Result<(), NavigationError> {
        self.record(path, NavigationKind::Navigate, flash)
    }

    fn redirect(&self, path: &str) -> Result<(), NavigationError> {
        self.record(path, NavigationKind::Redirect, None)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_navigation_is_recorded() {
        let navigator = MemoryNavigator::new("/user/dashboard");
        navigator
            .navigate("/login", Some(FlashMessage::success("You have been logged out.")))
            .unwrap();
        navigator.redirect("/login").unwrap();

        assert_eq!(navigator.current_path(), "/login");
        let kinds: Vec<NavigationKind> = navigator.history().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![NavigationKind::Navigate, NavigationKind::Redirect]);
        assert_eq!(
            navigator.history()[0].flash.as_ref().map(|f| f.content.as_str()),
            Some("You have been logged out.")
        );
    }

    #[test]
    fn test_redirect_drops_pending_flash() {
        let navigator = MemoryNavigator::new("/");
        navigator
            .navigate("/login", Some(FlashMessage::success("hi")))
            .unwrap();
        navigator.redirect("/login").unwrap();

        assert!(navigator.take_flash().is_none());
    }

    #[test]
    fn test_take_flash_consumes() {
        let navigator = MemoryNavigator::new("/");
        navigator
            .navigate("/login", Some(FlashMessage::error("nope")))
            .unwrap();

        assert!(navigator.take_flash().is_some());
        assert!(navigator.take_flash().is_none());
    }

    #[test]
    fn test_relative_path_rejected() {
        let navigator = MemoryNavigator::new("/");
        let err = navigator.navigate("login", None).unwrap_err();

        assert!(matches!(err, NavigationError::Failed { .. }));
        assert_eq!(navigator.current_path(), "/");
        assert!(navigator.history().is_empty());
    }
}
