//! Reminder payload handed to a notification scheduler.
//!
//! Mirrors the extension's `scheduleNotification` message: the task id, a
//! title, a message body and the due time in epoch milliseconds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::task::{Task, TaskId};

/// A one-shot alert for a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    /// Task this reminder belongs to.
    pub task_id: TaskId,
    /// Alert title (the task title).
    pub title: String,
    /// Alert body.
    pub message: String,
    /// When the alert should fire.
    #[serde(rename = "dueTime", with = "chrono::serde::ts_milliseconds")]
    pub due: DateTime<Utc>,
}

impl Reminder {
    /// Builds a reminder for a task's due date, firing at the start of that
    /// day (UTC).
    ///
    /// Returns `None` if the task has no due date.
    #[must_use]
    pub fn for_task(task: &Task, message: impl Into<String>) -> Option<Self> {
        let due = task.due_date?.and_hms_opt(0, 0, 0)?.and_utc();
        Some(Self {
            task_id: task.id.clone(),
            title: task.title.clone(),
            message: message.into(),
            due,
        })
    }
}
