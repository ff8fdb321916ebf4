//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the session core and external systems.
//! Each port is a trait implemented by adapters in the infrastructure layer.

mod auth_api;
mod navigator;
mod session_listener;
mod storage;

pub use auth_api::{AuthApi, AuthResponse, LoginRequest, ProfileApi, ProfileUpdate};
pub use navigator::{NavigationError, Navigator};
pub use session_listener::SessionListener;
pub use storage::{KeyValueStorage, StorageError};
