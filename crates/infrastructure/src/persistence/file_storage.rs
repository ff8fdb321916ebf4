//! File-backed key-value storage.
//!
//! All entries live in one JSON document:
//! ```json
//! {
//!   "schema_version": 1,
//!   "items": {
//!     "token": "eyJhbGciOi...",
//!     "user": "{\"email\":\"a@b.com\",\"name\":\"Ann\",\"roleList\":[]}"
//!   }
//! }
//! ```
//! Writes go to a sibling temp file which is then renamed over the document,
//! so a crash never leaves a half-written session behind.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use scm_application::{KeyValueStorage, StorageError};
use serde::{Deserialize, Serialize};
use serde_json::ser::{PrettyFormatter, Serializer};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct StorageDocument {
    schema_version: u32,
    #[serde(default)]
    items: BTreeMap<String, String>,
}

impl Default for StorageDocument {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            items: BTreeMap::new(),
        }
    }
}

/// Storage persisted to a single JSON file.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStorage {
    /// Creates a storage backed by the file at `path`. The file is created on
    /// first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Default location: `<data dir>/scm/session.json`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("scm").join("session.json"))
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> Result<StorageDocument, StorageError> {
        let content = match fs::read(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(StorageDocument::default());
            }
            Err(e) => return Err(e.into()),
        };

        let document: StorageDocument = serde_json::from_slice(&content)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        if document.schema_version > SCHEMA_VERSION {
            return Err(StorageError::Serialization(format!(
                "unsupported schema version {}",
                document.schema_version
            )));
        }
        Ok(document)
    }

    async fn write_document(&self, document: &StorageDocument) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, to_pretty_json(document)?).await?;
        fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), entries = document.items.len(), "Session storage written");
        Ok(())
    }

    /// Applies `change` to the document under the write lock, writing only
    /// when something changed.
    async fn update<F>(&self, change: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut BTreeMap<String, String>) -> bool + Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut document = self.read_document().await?;
        document.schema_version = SCHEMA_VERSION;
        if change(&mut document.items) {
            self.write_document(&document).await?;
        }
        Ok(())
    }
}

/// Two-space indented JSON with a trailing newline.
fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>, StorageError> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"  ");
    let mut serializer = Serializer::with_formatter(&mut buffer, formatter);
    value
        .serialize(&mut serializer)
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
    buffer.push(b'\n');
    Ok(buffer)
}

#[async_trait]
impl KeyValueStorage for FileStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut document = self.read_document().await?;
        Ok(document.items.remove(key))
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|items| {
            items.insert(key.to_string(), value.to_string()).as_deref() != Some(value)
        })
        .await
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.update(|items| items.remove(key).is_some()).await
    }

    async fn set_items(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        self.update(|items| {
            entries.iter().fold(false, |changed, (key, value)| {
                items.insert((*key).to_string(), (*value).to_string()).as_deref() != Some(*value)
                    || changed
            })
        })
        .await
    }

    async fn remove_items(&self, keys: &[&str]) -> Result<(), StorageError> {
        self.update(|items| {
            keys.iter()
                .fold(false, |changed, key| items.remove(*key).is_some() || changed)
        })
        .await
    }
}
