//! Backend API client using reqwest.
//!
//! Every request passes through the same pipeline:
//! - the persisted credential, if any, is attached as a bearer token
//! - a 401 response clears the persisted session, tells the attached
//!   [`SessionListener`] to sign out, schedules a delayed hard redirect to the
//!   login page (unless already there), and is returned to the caller as
//!   [`ApiError::Unauthorized`]
//!
//! The client keeps no session state of its own; it reads the credential from
//! the session store on every request.

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock, Weak};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder, Response};
use scm_application::{
    ApiError, AuthApi, AuthResponse, LoginRequest, Navigator, ProfileApi, ProfileUpdate,
    SessionListener, SessionStore,
};
use scm_domain::{Credential, SessionUser};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

/// Connection and interception settings for [`ReqwestApiClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiClientConfig {
    /// Backend root, e.g. `http://localhost:8081`.
    pub base_url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Login entry point a 401 redirects to.
    pub login_path: String,
    /// Delay before the redirect fires.
    pub redirect_delay: Duration,
}

impl ApiClientConfig {
    /// Creates a configuration with the default timeout, login path and
    /// redirect delay.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(30),
            login_path: scm_domain::route::LOGIN_PATH.to_string(),
            redirect_delay: Duration::from_millis(1000),
        }
    }
}

/// Error body shapes returned by the backend.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    errors: BTreeMap<String, String>,
}

/// HTTP client for the Smart Contact Manager backend.
pub struct ReqwestApiClient {
    client: Client,
    base_url: Url,
    timeout_ms: u64,
    store: SessionStore,
    navigator: Arc<dyn Navigator>,
    login_path: String,
    redirect_delay: Duration,
    redirect_pending: Arc<AtomicBool>,
    listener: OnceLock<Weak<dyn SessionListener>>,
}

impl ReqwestApiClient {
    /// Creates a client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying client cannot be created.
    pub fn new(
        config: ApiClientConfig,
        store: SessionStore,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(concat!("scm/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

        let mut base_url = config.base_url;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            client,
            base_url,
            timeout_ms: u64::try_from(config.timeout.as_millis()).unwrap_or(u64::MAX),
            store,
            navigator,
            login_path: config.login_path,
            redirect_delay: config.redirect_delay,
            redirect_pending: Arc::new(AtomicBool::new(false)),
            listener: OnceLock::new(),
        })
    }

    /// Attaches the listener told about server-side session revocation.
    ///
    /// Only a weak reference is kept; the listener usually owns this client.
    /// The first attached listener stays in place.
    pub fn attach_listener(&self, listener: &Arc<dyn SessionListener>) {
        if self.listener.set(Arc::downgrade(listener)).is_err() {
            warn!("Session listener already attached, ignoring");
        }
    }

    /// Resolves an API path against the base URL.
    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::InvalidRequest(format!("{e}: {path}")))
    }

    /// Sends a GET request and decodes the JSON response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, is rejected, or the body cannot
    /// be decoded.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let builder = self.client.get(self.endpoint(path)?);
        let response = self.execute(builder).await?;
        Self::decode(response).await
    }

    /// Sends a POST request with a JSON body and decodes the JSON response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, is rejected, or the body cannot
    /// be decoded.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let builder = self.client.post(self.endpoint(path)?).json(body);
        let response = self.execute(builder).await?;
        Self::decode(response).await
    }

    /// Sends a PUT request with a JSON body and decodes the JSON response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, is rejected, or the body cannot
    /// be decoded.
    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let builder = self.client.put(self.endpoint(path)?).json(body);
        let response = self.execute(builder).await?;
        Self::decode(response).await
    }

    /// Sends a DELETE request, ignoring any response body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let builder = self.client.delete(self.endpoint(path)?);
        self.execute(builder).await.map(|_| ())
    }

    /// Attaches the credential, sends, and intercepts failures.
    async fn execute(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let builder = match self.current_credential().await {
            Some(credential) => builder.header(AUTHORIZATION, credential.bearer_value()),
            None => builder,
        };

        let response = builder.send().await.map_err(|e| self.map_error(e))?;
        if response.status().is_success() {
            return Ok(response);
        }

        let error = Self::error_from_response(response).await;
        if error.is_unauthorized() {
            self.handle_unauthorized().await;
        }
        Err(error)
    }

    async fn current_credential(&self) -> Option<Credential> {
        match self.store.credential().await {
            Ok(credential) => credential,
            Err(e) => {
                warn!(error = %e, "Could not read credential, sending unauthenticated");
                None
            }
        }
    }

    async fn handle_unauthorized(&self) {
        warn!("Received 401, clearing authentication data");
        if let Err(e) = self.store.clear().await {
            warn!(error = %e, "Could not clear persisted session");
        }
        if let Some(listener) = self.listener.get().and_then(Weak::upgrade) {
            listener.session_invalidated();
        }
        self.schedule_login_redirect();
    }

    /// Schedules one hard redirect to the login page.
    ///
    /// Concurrent 401s coalesce into a single pending redirect. The location
    /// is checked again when the delay elapses.
    fn schedule_login_redirect(&self) {
        if self.navigator.current_path() == self.login_path {
            return;
        }
        if self.redirect_pending.swap(true, Ordering::AcqRel) {
            debug!("Login redirect already scheduled");
            return;
        }

        let navigator = Arc::clone(&self.navigator);
        let pending = Arc::clone(&self.redirect_pending);
        let login_path = self.login_path.clone();
        let delay = self.redirect_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if navigator.current_path() != login_path {
                if let Err(e) = navigator.redirect(&login_path) {
                    warn!(error = %e, "Login redirect failed");
                }
            }
            pending.store(false, Ordering::Release);
        });
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    async fn error_from_response(response: Response) -> ApiError {
        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();
        let message = body.message.or(body.error);

        match status {
            401 => ApiError::Unauthorized { message },
            400 | 422 => ApiError::Validation {
                message,
                fields: body.errors,
            },
            _ => ApiError::Status { status, message },
        }
    }

    /// Maps reqwest errors to [`ApiError`].
    fn map_error(&self, error: reqwest::Error) -> ApiError {
        if error.is_timeout() {
            return ApiError::Timeout {
                timeout_ms: self.timeout_ms,
            };
        }
        if error.is_builder() {
            return ApiError::InvalidRequest(error.to_string());
        }
        if error.is_connect() {
            let host = error
                .url()
                .and_then(|u| u.host_str().map(String::from))
                .unwrap_or_else(|| "unknown".to_string());
            return ApiError::Network(format!("could not connect to {host}: {error}"));
        }
        ApiError::Network(error.to_string())
    }
}

#[async_trait]
impl AuthApi for ReqwestApiClient {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        self.post_json("api/auth/login", request).await
    }

    async fn validate(&self, credential: &Credential) -> Result<AuthResponse, ApiError> {
        let body = serde_json::json!({ "token": credential.as_str() });
        self.post_json("api/auth/validate", &body).await
    }
}

#[async_trait]
impl ProfileApi for ReqwestApiClient {
    async fn fetch_profile(&self) -> Result<SessionUser, ApiError> {
        self.get_json("api/user/profile").await
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<SessionUser, ApiError> {
        self.put_json("api/user/profile", update).await
    }
}
