//! Conversion between the task collection and its stored JSON form.
//!
//! The whole collection lives under a single key ([`TASKS_KEY`]) as a JSON
//! array of [`Task`] records.

use serde_json::Value;

use crate::task::Task;

/// Storage key holding the task collection.
pub const TASKS_KEY: &str = "tasks";

/// Error type for codec encode/decode operations.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// The stored value is not a JSON array.
    #[error("expected a JSON array of tasks, found {0}")]
    NotAnArray(&'static str),
}

/// Encodes the task collection into a JSON array.
///
/// # Errors
///
/// Returns `CodecError::Serialization` if a task cannot be serialized.
pub fn encode_tasks(tasks: &[Task]) -> Result<Value, CodecError> {
    Ok(serde_json::to_value(tasks)?)
}

/// Decodes a stored value back into a task collection.
///
/// `null` decodes to an empty collection.
///
/// # Errors
///
/// Returns `CodecError::NotAnArray` for any non-array value other than
/// `null`, or `CodecError::Serialization` if an element is malformed.
pub fn decode_tasks(value: Value) -> Result<Vec<Task>, CodecError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(_) => Ok(serde_json::from_value(value)?),
        other => Err(CodecError::NotAnArray(json_kind(&other))),
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
