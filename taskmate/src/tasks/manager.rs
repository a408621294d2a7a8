//! Task manager for local task CRUD with write-through persistence.
//!
//! `TaskManager` provides the application-layer interface for creating,
//! updating, completing and deleting tasks. Every mutation rewrites the
//! whole collection under a single store key before returning.

use taskmate_proto::codec::{TASKS_KEY, decode_tasks, encode_tasks};
use taskmate_proto::task::{Task, TaskDraft, TaskId, TaskPatch};

use super::TaskError;
use crate::storage::KeyValueStore;

/// Owns the ordered task collection and its durable mirror.
///
/// Call [`load_tasks`](Self::load_tasks) before the first mutation;
/// otherwise the first save replaces whatever was stored with the
/// (empty or partial) in-memory collection.
///
/// Mutations take `&mut self`, so a host sharing one manager across tasks
/// has to put it behind a lock, which serializes the read-modify-write
/// cycles. Two managers over the same store are not coordinated.
pub struct TaskManager<S: KeyValueStore> {
    /// Durable mirror of the collection.
    store: S,
    /// Tasks in insertion order.
    tasks: Vec<Task>,
}

impl<S: KeyValueStore> TaskManager<S> {
    /// Creates a manager with an empty collection over the given store.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self {
            store,
            tasks: Vec::new(),
        }
    }

    /// Replaces the in-memory collection with the stored one, or with an
    /// empty collection if nothing has been stored yet.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Storage`] if the read fails, or
    /// [`TaskError::Codec`] if the stored value is not a task list. The
    /// in-memory collection is unchanged on error.
    pub async fn load_tasks(&mut self) -> Result<(), TaskError> {
        let tasks = match self.store.get(TASKS_KEY).await? {
            Some(value) => decode_tasks(value)?,
            None => Vec::new(),
        };
        tracing::info!(count = tasks.len(), "loaded tasks");
        self.tasks = tasks;
        Ok(())
    }

    /// Returns all tasks in insertion order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Looks up a task by id.
    #[must_use]
    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == *id)
    }

    /// Returns the backing store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Creates a task from `draft`, appends it, and persists the collection.
    ///
    /// Returns the new task's id.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError`] if persisting fails. The task stays in the
    /// in-memory collection; call [`load_tasks`](Self::load_tasks) to
    /// resynchronize.
    pub async fn add_task(&mut self, draft: TaskDraft) -> Result<TaskId, TaskError> {
        let task = Task::from_draft(self.fresh_id(), draft);
        let id = task.id.clone();
        tracing::info!(task_id = %id, title = %task.title, "adding task");
        self.tasks.push(task);
        self.save_tasks().await?;
        Ok(id)
    }

    /// Merges `patch` into the task with the given id and persists.
    ///
    /// Returns `Ok(false)` without writing anything if no task matches.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError`] if persisting fails. The patch stays applied
    /// in memory.
    pub async fn update_task(&mut self, id: &TaskId, patch: TaskPatch) -> Result<bool, TaskError> {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == *id) else {
            tracing::debug!(task_id = %id, "update for unknown task ignored");
            return Ok(false);
        };
        task.apply(patch);
        tracing::info!(task_id = %id, "updated task");
        self.save_tasks().await?;
        Ok(true)
    }

    /// Removes the task with the given id and persists the collection.
    ///
    /// Returns whether a task was removed. The collection is written even
    /// when nothing matched.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError`] if persisting fails. The removal stays applied
    /// in memory.
    pub async fn delete_task(&mut self, id: &TaskId) -> Result<bool, TaskError> {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != *id);
        let removed = self.tasks.len() != before;
        if removed {
            tracing::info!(task_id = %id, "deleted task");
        } else {
            tracing::debug!(task_id = %id, "delete for unknown task");
        }
        self.save_tasks().await?;
        Ok(removed)
    }

    /// Flips the completion flag of the task with the given id and persists.
    ///
    /// Returns the new completion state, or `None` without writing anything
    /// if no task matches.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError`] if persisting fails. The flip stays applied in
    /// memory.
    pub async fn toggle_task_completion(&mut self, id: &TaskId) -> Result<Option<bool>, TaskError> {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == *id) else {
            tracing::debug!(task_id = %id, "toggle for unknown task ignored");
            return Ok(None);
        };
        task.completed = !task.completed;
        let completed = task.completed;
        tracing::info!(task_id = %id, completed, "toggled task");
        self.save_tasks().await?;
        Ok(Some(completed))
    }

    /// Writes the full collection under [`TASKS_KEY`].
    async fn save_tasks(&self) -> Result<(), TaskError> {
        let value = encode_tasks(&self.tasks)?;
        if let Err(err) = self.store.set(TASKS_KEY, value).await {
            tracing::warn!(
                error = %err,
                count = self.tasks.len(),
                "saving tasks failed; in-memory collection is ahead of storage"
            );
            return Err(err.into());
        }
        Ok(())
    }

    /// Generates an id not already present in the collection.
    fn fresh_id(&self) -> TaskId {
        loop {
            let id = TaskId::new();
            if self.task(&id).is_none() {
                return id;
            }
        }
    }
}
