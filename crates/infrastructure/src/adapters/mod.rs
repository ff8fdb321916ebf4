//! Port adapters for HTTP and navigation.

mod memory_navigator;
mod reqwest_client;

pub use memory_navigator::{MemoryNavigator, NavigationEntry, NavigationKind};
pub use reqwest_client::{ApiClientConfig, ReqwestApiClient};
