//! Task list management for `TaskMate`.
//!
//! [`TaskManager`] owns the ordered in-memory task collection and mirrors it
//! to a [`KeyValueStore`](crate::storage::KeyValueStore) on every mutation.
//! The [`view`] module holds the filter/sort helpers used before display.

pub mod manager;
pub mod view;

pub use manager::TaskManager;
pub use view::{SortOrder, StatusFilter, parse_tags, select};

use taskmate_proto::codec::CodecError;
use thiserror::Error;

use crate::storage::StorageError;

/// Errors that can occur during task operations.
///
/// An unknown task id is not an error: update, delete and toggle report a
/// miss through their return value instead.
#[derive(Debug, Error)]
pub enum TaskError {
    /// The backing store failed to read or write the collection.
    #[error("task storage failed: {0}")]
    Storage(#[from] StorageError),
    /// The stored collection could not be decoded, or the in-memory one
    /// could not be encoded.
    #[error("task data invalid: {0}")]
    Codec(#[from] CodecError),
}
