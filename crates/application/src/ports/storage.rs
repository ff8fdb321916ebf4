//! Key-value storage port
//!
//! Models the browser-style string storage the session survives reloads in.

use async_trait::async_trait;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing document could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// String key-value storage.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    /// Reads the value stored under `key`.
    ///
    /// # Errors
    /// Returns an error if the storage cannot be read.
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    /// Returns an error if the storage cannot be written.
    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes the value stored under `key`. Missing keys are not an error.
    ///
    /// # Errors
    /// Returns an error if the storage cannot be written.
    async fn remove_item(&self, key: &str) -> Result<(), StorageError>;

    /// Stores several entries.
    ///
    /// Adapters that can write all entries at once should override this.
    ///
    /// # Errors
    /// Returns an error if the storage cannot be written. Entries written
    /// before the failure may remain.
    async fn set_items(&self, items: &[(&str, &str)]) -> Result<(), StorageError> {
        for (key, value) in items {
            self.set_item(key, value).await?;
        }
        Ok(())
    }

    /// Removes several keys.
    ///
    /// Adapters that can remove all keys in one write should override this.
    ///
    /// # Errors
    /// Returns an error if the storage cannot be written.
    async fn remove_items(&self, keys: &[&str]) -> Result<(), StorageError> {
        for key in keys {
            self.remove_item(key).await?;
        }
        Ok(())
    }
}
