//! SCM Domain - Core session types
//!
//! This crate defines the domain model for the Smart Contact Manager
//! session core. All types here are pure Rust with no I/O dependencies.

pub mod credential;
pub mod error;
pub mod oauth;
pub mod route;
pub mod state;
pub mod user;

pub use credential::Credential;
pub use error::{DomainError, DomainResult};
pub use oauth::OAuthCallbackParams;
pub use route::{FlashMessage, GuardDecision, MessageKind, RouteConfig};
pub use state::{AuthState, SessionStatus};
pub use user::{ADMIN_ROLE, AuthProvider, SessionUser};
