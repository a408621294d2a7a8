//! In-memory key-value store.
//!
//! Keeps values in a `HashMap` behind a [`tokio::sync::Mutex`]. Nothing is
//! persisted; all data is lost when the store is dropped.

use std::collections::HashMap;

use serde_json::Value;
use tokio::sync::Mutex;

use super::{KeyValueStore, StorageError};

/// `HashMap`-backed [`KeyValueStore`].
pub struct InMemoryStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl InMemoryStore {
    /// Create a new, empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Create a store pre-populated with the given entries.
    pub fn with_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self {
            entries: Mutex::new(entries.into_iter().map(|(k, v)| (k.into(), v)).collect()),
        }
    }

    /// Number of keys currently stored.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Returns `true` if no keys are stored.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        self.entries.lock().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}
