//! SCM Application - Session use cases and ports
//!
//! This crate defines the application layer with:
//! - Port traits (storage, backend auth API, navigation)
//! - The auth session manager and its persisted session store
//! - Route guards and the OAuth callback handler
//! - Application-level error handling

pub mod error;
pub mod ports;
pub mod routing;
pub mod session;

#[cfg(test)]
pub(crate) mod mocks;

pub use error::{ApiError, AuthError, AuthResult};
pub use ports::{
    AuthApi, AuthResponse, KeyValueStorage, LoginRequest, NavigationError, Navigator, ProfileApi,
    ProfileUpdate, SessionListener, StorageError,
};
pub use routing::{RouteGuard, RouteTable, Router};
pub use session::{
    AuthSessionManager, CallbackOutcome, OAuthCallbackHandler, RestoreOutcome, SessionSettings,
    SessionStore, StoredSession, TOKEN_KEY, USER_KEY,
};
