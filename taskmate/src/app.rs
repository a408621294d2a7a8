//! Host composition.
//!
//! [`App`] builds the store, task manager, interval timer and theme manager
//! once from an [`AppConfig`] and hands them out by reference. Nothing in
//! the library reaches for a global instance.

use std::sync::Arc;

use taskmate_proto::reminder::Reminder;
use taskmate_proto::task::{Task, TaskDraft, TaskId, TaskPatch};
use taskmate_proto::theme::Theme;

use crate::config::AppConfig;
use crate::reminder::{Notifier, ReminderError, ReminderScheduler, ScheduleStatus};
use crate::storage::{FileStore, KeyValueStore, StorageError};
use crate::tasks::{TaskError, TaskManager};
use crate::theme::{ThemeError, ThemeManager};
use crate::timer::IntervalTimer;

/// Message body used for due-date reminders.
pub const REMINDER_MESSAGE: &str = "Task due today";

/// Errors surfaced to the host.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The store could not be opened.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A task operation failed.
    #[error(transparent)]
    Tasks(#[from] TaskError),

    /// Reading or writing the theme failed.
    #[error(transparent)]
    Theme(#[from] ThemeError),

    /// Reminders could not be scheduled.
    #[error(transparent)]
    Reminder(#[from] ReminderError),

    /// A task title was empty or whitespace.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// No task id starts with the given text.
    #[error("no task matches id {0:?}")]
    UnknownTask(String),

    /// More than one task id starts with the given text.
    #[error("id prefix {prefix:?} is ambiguous ({matches} tasks match)")]
    AmbiguousTask {
        /// The prefix that was given.
        prefix: String,
        /// How many ids start with it.
        matches: usize,
    },
}

/// The running host: one store shared by the task and theme managers, plus
/// the interval timer.
pub struct App<S: KeyValueStore> {
    store: Arc<S>,
    tasks: TaskManager<Arc<S>>,
    timer: IntervalTimer,
    theme: ThemeManager<Arc<S>>,
}

impl App<FileStore> {
    /// Opens the file store named by `config` and starts the host on it.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] if the data directory is unusable, or
    /// any error from [`App::start`].
    pub async fn open(config: &AppConfig) -> Result<Self, AppError> {
        let store = match &config.data_dir {
            Some(dir) => FileStore::open(dir, &config.namespace)?,
            None => FileStore::open_default(&config.namespace)?,
        };
        tracing::info!(path = %store.path().display(), "using file store");
        Self::start(store, config).await
    }
}

impl<S: KeyValueStore> App<S> {
    /// Loads the stored tasks and theme and builds an idle timer.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Tasks`] if the stored tasks cannot be read, or
    /// [`AppError::Theme`] if the stored theme cannot be read.
    pub async fn start(store: S, config: &AppConfig) -> Result<Self, AppError> {
        let store = Arc::new(store);

        let mut tasks = TaskManager::new(Arc::clone(&store));
        tasks.load_tasks().await?;

        let theme =
            ThemeManager::init(Arc::clone(&store), config.theme_policy, config.prefers_dark)
                .await?;

        let timer = IntervalTimer::new(config.work_secs, config.break_secs);

        tracing::info!(
            tasks = tasks.tasks().len(),
            theme = %theme.current(),
            work_secs = config.work_secs,
            break_secs = config.break_secs,
            "taskmate started"
        );
        Ok(Self {
            store,
            tasks,
            timer,
            theme,
        })
    }

    /// The shared store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The task manager.
    #[must_use]
    pub const fn tasks(&self) -> &TaskManager<Arc<S>> {
        &self.tasks
    }

    /// Mutable access to the task manager.
    pub const fn tasks_mut(&mut self) -> &mut TaskManager<Arc<S>> {
        &mut self.tasks
    }

    /// The interval timer.
    #[must_use]
    pub const fn timer(&self) -> &IntervalTimer {
        &self.timer
    }

    /// The active theme.
    #[must_use]
    pub const fn theme(&self) -> Theme {
        self.theme.current()
    }

    /// Switches theme according to the configured policy.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Theme`] if persisting fails.
    pub async fn toggle_theme(&mut self) -> Result<Theme, AppError> {
        Ok(self.theme.toggle().await?)
    }

    /// Adds a task after checking that its title is not blank.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::EmptyTitle`] for a blank title, or
    /// [`AppError::Tasks`] if persisting fails.
    pub async fn add_task(&mut self, mut draft: TaskDraft) -> Result<TaskId, AppError> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(AppError::EmptyTitle);
        }
        draft.title = title.to_string();
        Ok(self.tasks.add_task(draft).await?)
    }

    /// Applies `patch` to the task matching `id_or_prefix`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::EmptyTitle`] if the patch sets a blank title, an
    /// id resolution error, or [`AppError::Tasks`] if persisting fails.
    pub async fn edit_task(
        &mut self,
        id_or_prefix: &str,
        mut patch: TaskPatch,
    ) -> Result<TaskId, AppError> {
        if let Some(title) = patch.title.as_mut() {
            let trimmed = title.trim();
            if trimmed.is_empty() {
                return Err(AppError::EmptyTitle);
            }
            *title = trimmed.to_string();
        }
        let id = self.resolve_id(id_or_prefix)?;
        self.tasks.update_task(&id, patch).await?;
        Ok(id)
    }

    /// Flips completion of the task matching `id_or_prefix`.
    ///
    /// Returns the task id and its new completion state.
    ///
    /// # Errors
    ///
    /// Returns an id resolution error, or [`AppError::Tasks`] if persisting
    /// fails.
    pub async fn toggle_task(&mut self, id_or_prefix: &str) -> Result<(TaskId, bool), AppError> {
        let id = self.resolve_id(id_or_prefix)?;
        let completed = self
            .tasks
            .toggle_task_completion(&id)
            .await?
            .ok_or_else(|| AppError::UnknownTask(id_or_prefix.to_string()))?;
        Ok((id, completed))
    }

    /// Deletes the task matching `id_or_prefix`.
    ///
    /// # Errors
    ///
    /// Returns an id resolution error, or [`AppError::Tasks`] if persisting
    /// fails.
    pub async fn delete_task(&mut self, id_or_prefix: &str) -> Result<Task, AppError> {
        let id = self.resolve_id(id_or_prefix)?;
        let task = self
            .tasks
            .task(&id)
            .cloned()
            .ok_or_else(|| AppError::UnknownTask(id_or_prefix.to_string()))?;
        self.tasks.delete_task(&id).await?;
        Ok(task)
    }

    /// Finds the single task whose id equals `input` or starts with it.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::UnknownTask`] if nothing matches, or
    /// [`AppError::AmbiguousTask`] if several ids share the prefix.
    pub fn resolve_id(&self, input: &str) -> Result<TaskId, AppError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(AppError::UnknownTask(String::new()));
        }
        if let Some(task) = self.tasks.tasks().iter().find(|t| t.id.as_str() == input) {
            return Ok(task.id.clone());
        }
        let matches: Vec<&TaskId> = self
            .tasks
            .tasks()
            .iter()
            .map(|t| &t.id)
            .filter(|id| id.as_str().starts_with(input))
            .collect();
        match matches.as_slice() {
            [] => Err(AppError::UnknownTask(input.to_string())),
            [id] => Ok((*id).clone()),
            many => Err(AppError::AmbiguousTask {
                prefix: input.to_string(),
                matches: many.len(),
            }),
        }
    }

    /// Schedules a due-date reminder for every pending task that has one.
    ///
    /// Returns how many were scheduled; reminders already in the past are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Reminder`] if called outside a tokio runtime.
    pub fn schedule_reminders<N: Notifier>(
        &self,
        scheduler: &mut ReminderScheduler<N>,
    ) -> Result<usize, AppError> {
        let mut scheduled = 0;
        for task in self.tasks.tasks().iter().filter(|t| !t.completed) {
            let Some(reminder) = Reminder::for_task(task, REMINDER_MESSAGE) else {
                continue;
            };
            if scheduler.schedule(reminder)? == ScheduleStatus::Scheduled {
                scheduled += 1;
            }
        }
        Ok(scheduled)
    }
}
