//! Hand-written port doubles shared by the unit tests.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use scm_domain::{Credential, FlashMessage};

use crate::error::ApiError;
use crate::ports::{
    AuthApi, AuthResponse, KeyValueStorage, LoginRequest, NavigationError, Navigator,
    StorageError,
};

/// In-memory storage that can be told to fail writes.
#[derive(Default)]
pub struct MockStorage {
    items: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
    failing_key: Mutex<Option<String>>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(self, key: &str, value: &str) -> Self {
        self.items
            .lock()
            .expect("Lock poisoned")
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn item(&self, key: &str) -> Option<String> {
        self.items.lock().expect("Lock poisoned").get(key).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().expect("Lock poisoned").is_empty()
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    /// Fails every write of `key` while other keys still succeed.
    pub fn fail_writes_of(&self, key: &str) {
        *self.failing_key.lock().expect("Lock poisoned") = Some(key.to_string());
    }

    fn check_writable(&self) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Io(std::io::Error::other("disk full")));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStorage for MockStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.item(key))
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_writable()?;
        if self.failing_key.lock().expect("Lock poisoned").as_deref() == Some(key) {
            return Err(StorageError::Io(std::io::Error::other("write rejected")));
        }
        self.items
            .lock()
            .expect("Lock poisoned")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.check_writable()?;
        self.items.lock().expect("Lock poisoned").remove(key);
        Ok(())
    }
}

type Scripted = (Duration, Result<AuthResponse, ApiError>);

/// Backend double answering from scripted responses.
#[derive(Default)]
pub struct MockAuthApi {
    logins: Mutex<VecDeque<Scripted>>,
    validations: Mutex<VecDeque<Result<AuthResponse, ApiError>>>,
    login_calls: AtomicUsize,
    validate_calls: AtomicUsize,
}

impl MockAuthApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn login_returns(self, result: Result<AuthResponse, ApiError>) -> Self {
        self.login_after(Duration::ZERO, result)
    }

    pub fn login_after(self, delay: Duration, result: Result<AuthResponse, ApiError>) -> Self {
        self.logins
            .lock()
            .expect("Lock poisoned")
            .push_back((delay, result));
        self
    }

    pub fn validate_returns(self, result: Result<AuthResponse, ApiError>) -> Self {
        self.validations
            .lock()
            .expect("Lock poisoned")
            .push_back(result);
        self
    }

    pub fn login_calls(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }

    pub fn validate_calls(&self) -> usize {
        self.validate_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthApi for MockAuthApi {
    async fn login(&self, _request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.logins.lock().expect("Lock poisoned").pop_front();
        let (delay, result) = scripted.unwrap_or_else(|| {
            (
                Duration::ZERO,
                Err(ApiError::Network("no scripted login".to_string())),
            )
        });
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        result
    }

    async fn validate(&self, _credential: &Credential) -> Result<AuthResponse, ApiError> {
        self.validate_calls.fetch_add(1, Ordering::SeqCst);
        self.validations
            .lock()
            .expect("Lock poisoned")
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Network("no scripted validation".to_string())))
    }
}

/// Navigator double recording every transition.
pub struct MockNavigator {
    current: Mutex<String>,
    visits: Mutex<Vec<(String, Option<FlashMessage>)>>,
    fail: AtomicBool,
}

impl MockNavigator {
    pub fn at(path: &str) -> Self {
        Self {
            current: Mutex::new(path.to_string()),
            visits: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
        }
    }

    pub fn failing() -> Self {
        let navigator = Self::at("/user/dashboard");
        navigator.fail.store(true, Ordering::SeqCst);
        navigator
    }

    pub fn visits(&self) -> Vec<(String, Option<FlashMessage>)> {
        self.visits.lock().expect("Lock poisoned").clone()
    }

    fn go(&self, path: &str, flash: Option<FlashMessage>) -> Result<(), NavigationError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(NavigationError::Failed {
                path: path.to_string(),
                reason: "router unavailable".to_string(),
            });
        }
        *self.current.lock().expect("Lock poisoned") = path.to_string();
        self.visits
            .lock()
            .expect("Lock poisoned")
            .push((path.to_string(), flash));
        Ok(())
    }
}

impl Navigator for MockNavigator {
    fn current_path(&self) -> String {
        self.current.lock().expect("Lock poisoned").clone()
    }

    fn navigate(&self, path: &str, flash: Option<FlashMessage>) -> Result<(), NavigationError> {
        self.go(path, flash)
    }

    fn redirect(&self, path: &str) -> Result<(), NavigationError> {
        self.go(path, None)
    }
}
