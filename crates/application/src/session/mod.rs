//! Session lifecycle: persisted entries, the auth session manager, and the
//! OAuth callback handler.

mod manager;
mod oauth_callback;
mod store;

pub use manager::{AuthSessionManager, RestoreOutcome, SessionSettings};
pub use oauth_callback::{CallbackOutcome, OAuthCallbackHandler};
pub use store::{SessionStore, StoredSession, TOKEN_KEY, USER_KEY};
