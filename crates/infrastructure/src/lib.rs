//! SCM Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer.

pub mod adapters;
pub mod persistence;
pub mod settings;

pub use adapters::{
    ApiClientConfig, MemoryNavigator, NavigationEntry, NavigationKind, ReqwestApiClient,
};
pub use persistence::{FileStorage, MemoryStorage};
pub use settings::{ApiSettings, AppSettings, SessionSection, SettingsError};
