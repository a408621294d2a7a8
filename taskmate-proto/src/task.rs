//! Task data model for `TaskMate`.
//!
//! Defines the persisted [`Task`] record, the [`TaskDraft`] used to create
//! one, and the [`TaskPatch`] used for partial updates. Field names are
//! serialized in camelCase so collections written by the browser extension
//! load unchanged.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

/// Opaque unique identifier for a task.
///
/// New identifiers are random UUID v4 strings. Identifiers read back from
/// storage are kept verbatim and never reinterpreted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Generates a fresh random task identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wraps an existing identifier string.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when parsing a [`Priority`] from text fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown priority {0:?} (expected high, medium or low)")]
pub struct ParsePriorityError(String);

/// Task priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Most urgent.
    High,
    /// The default for new tasks.
    #[default]
    Medium,
    /// Least urgent.
    Low,
}

impl Priority {
    /// Sort rank, lowest first: high, medium, low.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::High => 1,
            Self::Medium => 2,
            Self::Low => 3,
        }
    }

    /// Returns the lowercase name used in storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ParsePriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(ParsePriorityError(s.to_string())),
        }
    }
}

/// A nested checklist entry inside a task.
///
/// The stored record is kept verbatim: fields this crate does not know
/// about, and entries that are not objects at all, survive every load and
/// save untouched. The accessors read the conventional `title` and
/// `completed` fields when present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Subtask(Value);

impl Subtask {
    /// Creates an open subtask with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self(json!({ "title": title.into(), "completed": false }))
    }

    /// Wraps a stored subtask record as-is.
    #[must_use]
    pub const fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// The subtask's title: its `title` field, or the entry itself when it
    /// is a bare string.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        match &self.0 {
            Value::String(title) => Some(title),
            other => other.get("title").and_then(Value::as_str),
        }
    }

    /// Whether the entry's `completed` field is `true`.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.0.get("completed").and_then(Value::as_bool).unwrap_or(false)
    }

    /// The stored record.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }
}

/// A persisted unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique, immutable identifier assigned at creation.
    pub id: TaskId,
    /// Task title. Emptiness is checked by callers, not here.
    #[serde(default)]
    pub title: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Optional due date (`YYYY-MM-DD` on disk).
    #[serde(default, deserialize_with = "deserialize_due_date")]
    pub due_date: Option<NaiveDate>,
    /// Task priority.
    #[serde(default)]
    pub priority: Priority,
    /// Ordered labels. Duplicates are allowed.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Completion flag.
    #[serde(default)]
    pub completed: bool,
    /// Ordered nested checklist.
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
}

impl Task {
    /// Builds a task from a draft, filling every omitted field with its
    /// default.
    #[must_use]
    pub fn from_draft(id: TaskId, draft: TaskDraft) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description.unwrap_or_default(),
            due_date: draft.due_date,
            priority: draft.priority.unwrap_or_default(),
            tags: draft.tags.unwrap_or_default(),
            completed: draft.completed.unwrap_or(false),
            subtasks: draft.subtasks.unwrap_or_default(),
        }
    }

    /// Overwrites the fields present in `patch`, leaving the rest untouched.
    ///
    /// The identifier is never changed.
    pub fn apply(&mut self, patch: TaskPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        if let Some(subtasks) = patch.subtasks {
            self.subtasks = subtasks;
        }
    }
}

/// Fields supplied when creating a task. Anything left as `None` takes the
/// documented default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    /// Task title.
    pub title: String,
    /// Description (default empty).
    pub description: Option<String>,
    /// Due date (default none).
    pub due_date: Option<NaiveDate>,
    /// Priority (default medium).
    pub priority: Option<Priority>,
    /// Tags (default empty).
    pub tags: Option<Vec<String>>,
    /// Completion flag (default false).
    pub completed: Option<bool>,
    /// Subtasks (default empty).
    pub subtasks: Option<Vec<Subtask>>,
}

impl TaskDraft {
    /// Starts a draft with only a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Sets the tags.
    #[must_use]
    pub fn tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the completion flag.
    #[must_use]
    pub const fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    /// Sets the subtasks.
    #[must_use]
    pub fn subtasks(mut self, subtasks: Vec<Subtask>) -> Self {
        self.subtasks = Some(subtasks);
        self
    }
}

/// A partial update. Only `Some` fields overwrite the stored task.
///
/// `due_date` is doubly optional: `Some(None)` clears the date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New due date, or `Some(None)` to clear it.
    pub due_date: Option<Option<NaiveDate>>,
    /// New priority.
    pub priority: Option<Priority>,
    /// Replacement tag list.
    pub tags: Option<Vec<String>>,
    /// New completion flag.
    pub completed: Option<bool>,
    /// Replacement subtask list.
    pub subtasks: Option<Vec<Subtask>>,
}

impl TaskPatch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.due_date.is_none()
            && self.priority.is_none()
            && self.tags.is_none()
            && self.completed.is_none()
            && self.subtasks.is_none()
    }

    /// Replaces the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Replaces the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Replaces the due date; `None` clears it.
    #[must_use]
    pub const fn due_date(mut self, due_date: Option<NaiveDate>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Replaces the priority.
    #[must_use]
    pub const fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Replaces the tag list.
    #[must_use]
    pub fn tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    /// Replaces the completion flag.
    #[must_use]
    pub const fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    /// Replaces the subtask list.
    #[must_use]
    pub fn subtasks(mut self, subtasks: Vec<Subtask>) -> Self {
        self.subtasks = Some(subtasks);
        self
    }
}

/// Accepts `null`, `""` or `"YYYY-MM-DD"`. The extension's form stored an
/// empty string when no date was picked.
fn deserialize_due_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
