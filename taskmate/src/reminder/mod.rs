//! One-shot task reminders.
//!
//! [`ReminderScheduler`] sleeps until a [`Reminder`]'s due time on a tokio
//! task, then hands it to a [`Notifier`]. At most one reminder is pending
//! per task.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use taskmate_proto::reminder::Reminder;
use taskmate_proto::task::TaskId;
use tokio::task::JoinHandle;

/// Errors that can occur when scheduling a reminder.
#[derive(Debug, thiserror::Error)]
pub enum ReminderError {
    /// `schedule` was called outside a tokio runtime.
    #[error("reminder scheduling requires a running tokio runtime")]
    NoRuntime,
}

/// Receives reminders when they come due.
pub trait Notifier: Send + Sync + 'static {
    /// Deliver the alert. Runs on the scheduler's task; should not block.
    fn notify(&self, reminder: &Reminder);
}

impl<F> Notifier for F
where
    F: Fn(&Reminder) + Send + Sync + 'static,
{
    fn notify(&self, reminder: &Reminder) {
        self(reminder);
    }
}

/// What [`ReminderScheduler::schedule`] did with a reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleStatus {
    /// A timer is pending and will fire at the due time.
    Scheduled,
    /// The due time is not in the future; nothing will fire.
    Elapsed,
}

type Pending = Mutex<HashMap<TaskId, (u64, JoinHandle<()>)>>;

/// Schedules reminders and delivers them to a [`Notifier`].
pub struct ReminderScheduler<N: Notifier> {
    notifier: Arc<N>,
    pending: Arc<Pending>,
    next_generation: u64,
}

impl<N: Notifier> ReminderScheduler<N> {
    /// Creates a scheduler with nothing pending.
    #[must_use]
    pub fn new(notifier: N) -> Self {
        Self {
            notifier: Arc::new(notifier),
            pending: Arc::new(Mutex::new(HashMap::new())),
            next_generation: 0,
        }
    }

    /// Schedules `reminder` relative to the current wall-clock time.
    ///
    /// # Errors
    ///
    /// Returns [`ReminderError::NoRuntime`] if called outside a tokio
    /// runtime.
    pub fn schedule(&mut self, reminder: Reminder) -> Result<ScheduleStatus, ReminderError> {
        self.schedule_at(reminder, Utc::now())
    }

    /// Schedules `reminder` as if the current time were `now`.
    ///
    /// Any reminder already pending for the same task is cancelled first,
    /// even when the new one has already elapsed.
    ///
    /// # Errors
    ///
    /// Returns [`ReminderError::NoRuntime`] if called outside a tokio
    /// runtime.
    pub fn schedule_at(
        &mut self,
        reminder: Reminder,
        now: DateTime<Utc>,
    ) -> Result<ScheduleStatus, ReminderError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| ReminderError::NoRuntime)?;
        self.cancel(&reminder.task_id);

        let delay = match (reminder.due - now).to_std() {
            Ok(delay) if !delay.is_zero() => delay,
            _ => {
                tracing::debug!(task_id = %reminder.task_id, due = %reminder.due, "reminder already elapsed");
                return Ok(ScheduleStatus::Elapsed);
            }
        };

        self.next_generation += 1;
        let generation = self.next_generation;
        let task_id = reminder.task_id.clone();
        let notifier = Arc::clone(&self.notifier);
        let pending: Weak<Pending> = Arc::downgrade(&self.pending);

        tracing::info!(task_id = %task_id, delay_secs = delay.as_secs(), "reminder scheduled");

        // Held across the spawn so the task cannot finish before its entry
        // exists.
        let mut guard = self.pending.lock();
        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            tracing::info!(task_id = %reminder.task_id, "reminder due");
            notifier.notify(&reminder);
            if let Some(pending) = pending.upgrade() {
                let mut pending = pending.lock();
                if pending
                    .get(&reminder.task_id)
                    .is_some_and(|(g, _)| *g == generation)
                {
                    pending.remove(&reminder.task_id);
                }
            }
        });
        guard.insert(task_id, (generation, handle));
        Ok(ScheduleStatus::Scheduled)
    }

    /// Cancels the pending reminder for `task_id`. Returns `true` if one
    /// was pending.
    pub fn cancel(&self, task_id: &TaskId) -> bool {
        let Some((_, handle)) = self.pending.lock().remove(task_id) else {
            return false;
        };
        handle.abort();
        tracing::debug!(task_id = %task_id, "reminder cancelled");
        true
    }

    /// Returns `true` if a reminder is pending for `task_id`.
    #[must_use]
    pub fn is_pending(&self, task_id: &TaskId) -> bool {
        self.pending.lock().contains_key(task_id)
    }

    /// Number of reminders still waiting to fire.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }
}

impl<N: Notifier> Drop for ReminderScheduler<N> {
    fn drop(&mut self) {
        for (_, (_, handle)) in self.pending.lock().drain() {
            handle.abort();
        }
    }
}
