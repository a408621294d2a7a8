//! File-backed key-value store.
//!
//! Every namespace is a single JSON object document at
//! `<dir>/<namespace>.json`. Each write rewrites the whole document to a
//! temporary sibling and renames it into place, so a crash mid-write leaves
//! the previous document intact.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tokio::sync::Mutex;

use super::{KeyValueStore, StorageError};

/// Application directory name under the platform data dir.
const APP_DIR: &str = "taskmate";

/// JSON-document [`KeyValueStore`] on local disk.
pub struct FileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles on the document within this process.
    io_lock: Mutex<()>,
}

impl FileStore {
    /// Open (creating if needed) the namespace document under `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] if the namespace is not a plain
    /// file stem, or if `dir` cannot be created or is not a directory.
    pub fn open(dir: impl AsRef<Path>, namespace: &str) -> Result<Self, StorageError> {
        let dir = dir.as_ref();
        if namespace.is_empty()
            || namespace.starts_with('.')
            || namespace.contains(&['/', '\\'][..])
        {
            return Err(StorageError::Unavailable(format!(
                "invalid storage namespace {namespace:?}"
            )));
        }

        std::fs::create_dir_all(dir).map_err(|e| {
            StorageError::Unavailable(format!("cannot create {}: {e}", dir.display()))
        })?;
        if !dir.is_dir() {
            return Err(StorageError::Unavailable(format!(
                "{} is not a directory",
                dir.display()
            )));
        }

        let path = dir.join(format!("{namespace}.json"));
        tracing::debug!(path = %path.display(), "opened file store");
        Ok(Self {
            path,
            io_lock: Mutex::new(()),
        })
    }

    /// Open the namespace under the platform's local data directory
    /// (e.g. `~/.local/share/taskmate` on Linux).
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] if the platform has no local
    /// data directory, or if [`open`](Self::open) fails.
    pub fn open_default(namespace: &str) -> Result<Self, StorageError> {
        let base = dirs::data_local_dir().ok_or_else(|| {
            StorageError::Unavailable("could not determine local data directory".to_string())
        })?;
        Self::open(base.join(APP_DIR), namespace)
    }

    /// Path of the backing document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> Result<Map<String, Value>, StorageError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Map::new()),
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| StorageError::Corrupt(format!("{}: {e}", self.path.display()))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(StorageError::ReadFailed(format!(
                "{}: {e}",
                self.path.display()
            ))),
        }
    }

    async fn write_document(&self, document: &Map<String, Value>) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec_pretty(document)
            .map_err(|e| StorageError::WriteFailed(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| StorageError::WriteFailed(format!("{}: {e}", tmp.display())))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StorageError::WriteFailed(format!("{}: {e}", self.path.display())))
    }
}

impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let _guard = self.io_lock.lock().await;
        let mut document = self.read_document().await?;
        tracing::debug!(key, found = document.contains_key(key), "store get");
        Ok(document.remove(key))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        let _guard = self.io_lock.lock().await;
        let mut document = self.read_document().await?;
        document.insert(key.to_string(), value);
        self.write_document(&document).await?;
        tracing::debug!(key, "store set");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.io_lock.lock().await;
        let mut document = self.read_document().await?;
        if document.remove(key).is_some() {
            self.write_document(&document).await?;
            tracing::debug!(key, "store remove");
        }
        Ok(())
    }
}
