//! Application settings.
//!
//! Layered lowest to highest: built-in defaults, the TOML config file
//! (`<config dir>/scm/config.toml` unless overridden), then `SCM__*`
//! environment variables (`SCM__API__BASE_URL`, `SCM__SESSION__OPTIMISTIC_RESTORE`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use scm_application::SessionSettings;
use scm_domain::RouteConfig;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::adapters::ApiClientConfig;
use crate::persistence::FileStorage;

/// Errors raised while loading settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// A source could not be read or did not match the expected shape.
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// The API base URL is not an absolute http(s) URL.
    #[error("invalid API base URL '{0}'")]
    InvalidBaseUrl(String),

    /// No storage path was configured and the platform has no data directory.
    #[error("no data directory available; set session.storage_path")]
    NoDataDir,
}

/// Backend connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Backend root URL.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8081".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Session persistence and restoration settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    /// Session file; defaults to `<data dir>/scm/session.json`.
    pub storage_path: Option<PathBuf>,
    /// Keep the cached user when validation fails for a transient reason.
    pub optimistic_restore: bool,
    /// Delay before the login redirect that follows a 401.
    pub unauthorized_redirect_delay_ms: u64,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            storage_path: None,
            optimistic_restore: true,
            unauthorized_redirect_delay_ms: 1000,
        }
    }
}

/// All settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Backend connection.
    pub api: ApiSettings,
    /// Session handling.
    pub session: SessionSection,
    /// Named routes.
    pub routes: RouteConfig,
}

impl AppSettings {
    /// Loads settings from the config file and the process environment.
    ///
    /// A missing config file is not an error.
    ///
    /// # Errors
    /// Returns an error if a source is malformed.
    pub fn load(file: Option<&Path>) -> Result<Self, SettingsError> {
        Self::load_with(file, Self::environment())
    }

    /// Loads settings using the given environment source.
    ///
    /// # Errors
    /// Returns an error if a source is malformed.
    pub fn load_with(file: Option<&Path>, env: Environment) -> Result<Self, SettingsError> {
        let mut builder = Config::builder();
        if let Some(path) = file.map(Path::to_path_buf).or_else(default_config_path) {
            builder = builder.add_source(File::from(path).required(false));
        }

        let settings: Self = builder.add_source(env).build()?.try_deserialize()?;
        settings.api_base_url()?;
        Ok(settings)
    }

    /// The `SCM__SECTION__KEY` environment source.
    #[must_use]
    pub fn environment() -> Environment {
        Environment::with_prefix("SCM")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
    }

    /// Parsed backend URL.
    ///
    /// # Errors
    /// Returns an error unless the URL is absolute http or https.
    pub fn api_base_url(&self) -> Result<Url, SettingsError> {
        let url = Url::parse(&self.api.base_url)
            .map_err(|_| SettingsError::InvalidBaseUrl(self.api.base_url.clone()))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            _ => Err(SettingsError::InvalidBaseUrl(self.api.base_url.clone())),
        }
    }

    /// Resolved session file path.
    ///
    /// # Errors
    /// Returns an error if none is configured and no data directory exists.
    pub fn storage_path(&self) -> Result<PathBuf, SettingsError> {
        self.session
            .storage_path
            .clone()
            .or_else(FileStorage::default_path)
            .ok_or(SettingsError::NoDataDir)
    }

    /// Settings for the session manager.
    #[must_use]
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            optimistic_restore: self.session.optimistic_restore,
            routes: self.routes.clone(),
        }
    }

    /// Settings for the API client.
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid.
    pub fn api_client_config(&self) -> Result<ApiClientConfig, SettingsError> {
        Ok(ApiClientConfig {
            base_url: self.api_base_url()?,
            timeout: Duration::from_secs(self.api.request_timeout_secs),
            login_path: self.routes.login.clone(),
            redirect_delay: Duration::from_millis(self.session.unauthorized_redirect_delay_ms),
        })
    }
}

/// Default config file: `<config dir>/scm/config.toml`.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("scm").join("config.toml"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AppSettings::environment().source(Some(map))
    }

    fn missing_file(dir: &TempDir) -> PathBuf {
        dir.path().join("absent.toml")
    }

    #[test]
    fn test_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = AppSettings::load_with(Some(&missing_file(&dir)), env(&[])).unwrap();

        assert_eq!(settings, AppSettings::default());
        let api = settings.api_client_config().unwrap();
        assert_eq!(api.base_url.as_str(), "http://localhost:8081/");
        assert_eq!(api.timeout, Duration::from_secs(30));
        assert_eq!(api.redirect_delay, Duration::from_millis(1000));
        assert_eq!(api.login_path, "/login");
        assert!(settings.session_settings().optimistic_restore);
    }

    #[test]
    fn test_file_then_environment() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[api]
base_url = "https://contacts.example.com"
request_timeout_secs = 5

[session]
optimistic_restore = false

[routes]
landing = "/user/profile"
"#,
        )
        .unwrap();

        let settings = AppSettings::load_with(
            Some(&path),
            env(&[
                ("SCM__API__REQUEST_TIMEOUT_SECS", "12"),
                ("SCM__SESSION__UNAUTHORIZED_REDIRECT_DELAY_MS", "250"),
            ]),
        )
        .unwrap();

        assert_eq!(settings.api.base_url, "https://contacts.example.com");
        assert_eq!(settings.api.request_timeout_secs, 12);
        assert!(!settings.session.optimistic_restore);
        assert_eq!(settings.session.unauthorized_redirect_delay_ms, 250);
        assert_eq!(settings.routes.landing, "/user/profile");
        assert_eq!(settings.routes.login, "/login");
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let dir = TempDir::new().unwrap();
        let err = AppSettings::load_with(
            Some(&missing_file(&dir)),
            env(&[("SCM__API__BASE_URL", "ftp://example.com")]),
        )
        .unwrap_err();

        assert!(matches!(err, SettingsError::InvalidBaseUrl(_)));
    }

    #[test]
    fn test_explicit_storage_path_wins() {
        let settings = AppSettings {
            session: SessionSection {
                storage_path: Some(PathBuf::from("/tmp/scm/session.json")),
                ..SessionSection::default()
            },
            ..AppSettings::default()
        };

        assert_eq!(
            settings.storage_path().unwrap(),
            PathBuf::from("/tmp/scm/session.json")
        );
    }
}
