//! Key-value persistence abstraction for `TaskMate`.
//!
//! Defines the [`KeyValueStore`] trait that every backend must satisfy.
//! Concrete implementations include:
//! - [`file::FileStore`]: one JSON document per namespace on local disk
//! - [`memory::InMemoryStore`]: `HashMap`-backed store for tests and embedding
//!
//! Each call is independent and last-write-wins. There is no batching,
//! versioning or transaction support.

pub mod file;
pub mod memory;

use std::sync::Arc;

use serde_json::Value;

pub use file::FileStore;
pub use memory::InMemoryStore;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The local persistence capability is not available. Raised when a
    /// backend is constructed and never retried.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// A read operation failed.
    #[error("read failed: {0}")]
    ReadFailed(String),

    /// A write operation failed.
    #[error("write failed: {0}")]
    WriteFailed(String),

    /// The backing document exists but could not be parsed.
    #[error("stored data is corrupt: {0}")]
    Corrupt(String),
}

/// Async key-value store holding structured JSON values.
///
/// # Invariant
///
/// [`get`](KeyValueStore::get) on a missing key resolves to `Ok(None)`, and
/// [`remove`](KeyValueStore::remove) on a missing key resolves to `Ok(())`.
/// Absence is never an error.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    fn get(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<Value>, StorageError>> + Send;

    /// Store `value` under `key`, replacing any previous value.
    fn set(
        &self,
        key: &str,
        value: Value,
    ) -> impl std::future::Future<Output = Result<(), StorageError>> + Send;

    /// Delete the value stored under `key`, if any.
    fn remove(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<(), StorageError>> + Send;
}

impl<S: KeyValueStore> KeyValueStore for Arc<S> {
    fn get(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<Value>, StorageError>> + Send {
        (**self).get(key)
    }

    fn set(
        &self,
        key: &str,
        value: Value,
    ) -> impl std::future::Future<Output = Result<(), StorageError>> + Send {
        (**self).set(key, value)
    }

    fn remove(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<(), StorageError>> + Send {
        (**self).remove(key)
    }
}
