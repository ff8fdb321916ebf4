//! Navigation port

use scm_domain::FlashMessage;

/// Errors that can occur while navigating.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    /// The navigator refused or failed to change location.
    #[error("navigation to {path} failed: {reason}")]
    Failed {
        /// Requested path.
        path: String,
        /// Why it failed.
        reason: String,
    },
}

/// Port for reading and changing the current location.
///
/// `navigate` is an in-app transition that may carry a flash message;
/// `redirect` is a hard reload of the target location that drops any
/// in-memory view state.
pub trait Navigator: Send + Sync {
    /// Returns the current path.
    fn current_path(&self) -> String;

    /// Moves to `path`, replacing the current entry.
    ///
    /// # Errors
    /// Returns an error if the navigation fails.
    fn navigate(&self, path: &str, flash: Option<FlashMessage>) -> Result<(), NavigationError>;

    /// Hard-redirects to `path`.
    ///
    /// # Errors
    /// Returns an error if the redirect fails.
    fn redirect(&self, path: &str) -> Result<(), NavigationError>;
}
