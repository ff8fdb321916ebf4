//! Persisted session entries.
//!
//! The session is two string entries: the raw token under [`TOKEN_KEY`] and
//! the JSON-serialized user under [`USER_KEY`]. They are written and cleared
//! together.

use std::sync::Arc;

use scm_domain::{Credential, SessionUser};
use tracing::warn;

use crate::ports::{KeyValueStorage, StorageError};

/// Storage key of the raw bearer token.
pub const TOKEN_KEY: &str = "token";

/// Storage key of the serialized session user.
pub const USER_KEY: &str = "user";

/// What the storage currently holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredSession {
    /// Token or user entry is missing.
    Empty,
    /// Both entries exist but the user record failed validation.
    Corrupt {
        /// Why the record was rejected.
        reason: String,
    },
    /// A complete session.
    Present {
        /// Persisted token.
        credential: Credential,
        /// Last known user.
        user: SessionUser,
    },
}

/// Typed access to the persisted session.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn KeyValueStorage>,
}

impl SessionStore {
    /// Creates a session store on top of a key-value storage.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// Reads the persisted token, if any.
    ///
    /// # Errors
    /// Returns an error if the storage cannot be read.
    pub async fn credential(&self) -> Result<Option<Credential>, StorageError> {
        let token = self.storage.get_item(TOKEN_KEY).await?;
        Ok(token.and_then(|t| Credential::new(t).ok()))
    }

    /// Reads both entries and validates the user record.
    ///
    /// # Errors
    /// Returns an error if the storage cannot be read.
    pub async fn load(&self) -> Result<StoredSession, StorageError> {
        let Some(credential) = self.credential().await? else {
            return Ok(StoredSession::Empty);
        };
        let Some(raw_user) = self.storage.get_item(USER_KEY).await? else {
            return Ok(StoredSession::Empty);
        };

        match SessionUser::from_json(&raw_user) {
            Ok(user) => Ok(StoredSession::Present { credential, user }),
            Err(e) => Ok(StoredSession::Corrupt {
                reason: e.to_string(),
            }),
        }
    }

    /// Persists a complete session.
    ///
    /// When the write fails, both entries are removed so a token never
    /// outlives its user.
    ///
    /// # Errors
    /// Returns an error if the user cannot be serialized or either entry
    /// cannot be written.
    pub async fn save(&self, credential: &Credential, user: &SessionUser) -> Result<(), StorageError> {
        let raw_user = encode_user(user)?;
        let entries = [(TOKEN_KEY, credential.as_str()), (USER_KEY, raw_user.as_str())];
        if let Err(e) = self.storage.set_items(&entries).await {
            if let Err(cleanup) = self.clear().await {
                warn!(error = %cleanup, "Could not remove partially saved session");
            }
            return Err(e);
        }
        Ok(())
    }

    /// Replaces the persisted user, keeping the token.
    ///
    /// # Errors
    /// Returns an error if the user cannot be serialized or written.
    pub async fn save_user(&self, user: &SessionUser) -> Result<(), StorageError> {
        let raw_user = encode_user(user)?;
        self.storage.set_item(USER_KEY, &raw_user).await
    }

    /// Removes both entries.
    ///
    /// # Errors
    /// Returns an error if the storage cannot be written.
    pub async fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove_items(&[TOKEN_KEY, USER_KEY]).await
    }
}

fn encode_user(user: &SessionUser) -> Result<String, StorageError> {
    user.to_json()
        .map_err(|e| StorageError::Serialization(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::mocks::MockStorage;
    use pretty_assertions::assert_eq;

    fn store_with(storage: &Arc<MockStorage>) -> SessionStore {
        SessionStore::new(Arc::clone(storage) as Arc<dyn KeyValueStorage>)
    }

    #[tokio::test]
    async fn test_empty_storage() {
        let storage = Arc::new(MockStorage::new());
        let store = store_with(&storage);

        assert_eq!(store.load().await.unwrap(), StoredSession::Empty);
        assert!(store.credential().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_token_without_user_is_empty() {
        let storage = Arc::new(MockStorage::new().with_item(TOKEN_KEY, "t1"));
        let store = store_with(&storage);

        assert_eq!(store.load().await.unwrap(), StoredSession::Empty);
        assert_eq!(store.credential().await.unwrap().unwrap().as_str(), "t1");
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let storage = Arc::new(MockStorage::new());
        let store = store_with(&storage);
        let credential = Credential::new("t1").unwrap();
        let user = SessionUser::new("a@b.com", Some("A".to_string())).with_roles(["ROLE_USER"]);

        store.save(&credential, &user).await.unwrap();

        assert_eq!(
            store.load().await.unwrap(),
            StoredSession::Present { credential, user }
        );
        assert_eq!(storage.item(TOKEN_KEY).as_deref(), Some("t1"));
    }

    #[tokio::test]
    async fn test_corrupt_user_is_reported() {
        let storage = Arc::new(
            MockStorage::new()
                .with_item(TOKEN_KEY, "t1")
                .with_item(USER_KEY, "{\"name\":\"no email\"}"),
        );
        let store = store_with(&storage);

        assert!(matches!(
            store.load().await.unwrap(),
            StoredSession::Corrupt { .. }
        ));
    }

    #[tokio::test]
    async fn test_clear_removes_both_entries() {
        let storage = Arc::new(
            MockStorage::new()
                .with_item(TOKEN_KEY, "t1")
                .with_item(USER_KEY, "{}")
                .with_item("theme", "dark"),
        );
        let store = store_with(&storage);

        store.clear().await.unwrap();

        assert!(storage.item(TOKEN_KEY).is_none());
        assert!(storage.item(USER_KEY).is_none());
        assert_eq!(storage.item("theme").as_deref(), Some("dark"));
    }

    #[tokio::test]
    async fn test_failed_user_write_leaves_no_token() {
        let storage = Arc::new(MockStorage::new());
        storage.fail_writes_of(USER_KEY);
        let store = store_with(&storage);

        let result = store
            .save(
                &Credential::new("t1").unwrap(),
                &SessionUser::new("a@b.com", None),
            )
            .await;

        assert!(matches!(result, Err(StorageError::Io(_))));
        assert!(storage.item(TOKEN_KEY).is_none());
        assert!(store.credential().await.unwrap().is_none());
    }
}
