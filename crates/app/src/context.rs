//! Composition root.
//!
//! Wires exactly one storage, session store, navigator, API client and
//! session manager for the lifetime of the process.

use std::sync::Arc;

use scm_application::{
    AuthApi, AuthSessionManager, Navigator, OAuthCallbackHandler, RouteTable, Router,
    SessionListener, SessionStore,
};
use scm_infrastructure::{AppSettings, FileStorage, MemoryNavigator, ReqwestApiClient};
use tracing::debug;

/// Everything a command needs.
pub struct AppContext {
    pub settings: AppSettings,
    pub navigator: Arc<MemoryNavigator>,
    pub api: Arc<ReqwestApiClient>,
    pub manager: Arc<AuthSessionManager>,
    pub router: Router,
    pub oauth: OAuthCallbackHandler,
}

impl AppContext {
    /// Builds the object graph with the navigator positioned at `start`.
    ///
    /// # Errors
    /// Returns an error if the settings are unusable or the HTTP client
    /// cannot be created.
    pub fn build(settings: AppSettings, start: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let storage_path = settings.storage_path()?;
        debug!(path = %storage_path.display(), "Using session storage");

        let store = SessionStore::new(Arc::new(FileStorage::new(storage_path)));
        let navigator = Arc::new(MemoryNavigator::new(start));
        let dyn_navigator = Arc::clone(&navigator) as Arc<dyn Navigator>;

        let api = Arc::new(ReqwestApiClient::new(
            settings.api_client_config()?,
            store.clone(),
            Arc::clone(&dyn_navigator),
        )?);
        let manager = Arc::new(AuthSessionManager::new(
            store,
            Arc::clone(&api) as Arc<dyn AuthApi>,
            Arc::clone(&dyn_navigator),
            settings.session_settings(),
        ));
        api.attach_listener(&(Arc::clone(&manager) as Arc<dyn SessionListener>));
        let router = Router::new(
            Arc::clone(&manager),
            Arc::clone(&dyn_navigator),
            RouteTable::default(),
        );
        let oauth = OAuthCallbackHandler::new(Arc::clone(&manager), dyn_navigator);

        Ok(Self {
            settings,
            navigator,
            api,
            manager,
            router,
            oauth,
        })
    }
}
