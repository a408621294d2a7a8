//! Integration tests for the task lifecycle.
//!
//! Drives `TaskManager` through create, edit, complete and delete over both
//! the in-memory and the file-backed store, and checks what lands on disk.
//!
//! Verification command: `cargo test --test task_lifecycle`

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::json;

use taskmate::storage::{FileStore, InMemoryStore, KeyValueStore, StorageError};
use taskmate::tasks::{TaskError, TaskManager};
use taskmate_proto::codec::TASKS_KEY;
use taskmate_proto::task::{Priority, Subtask, TaskDraft, TaskId, TaskPatch};

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

async fn loaded<S: KeyValueStore>(store: S) -> TaskManager<S> {
    let mut mgr = TaskManager::new(store);
    mgr.load_tasks().await.expect("load should succeed");
    mgr
}

// ---------------------------------------------------------------------------
// End-to-end scenario
// ---------------------------------------------------------------------------

#[tokio::test]
async fn buy_milk_scenario() {
    let mut mgr = loaded(InMemoryStore::new()).await;

    let id = mgr.add_task(TaskDraft::new("Buy milk")).await.unwrap();
    assert_eq!(mgr.tasks().len(), 1);
    let task = mgr.task(&id).unwrap();
    assert!(!task.completed);
    assert_eq!(task.priority, Priority::Medium);

    let found = mgr
        .update_task(&id, TaskPatch::new().priority(Priority::High))
        .await
        .unwrap();
    assert!(found);
    let task = mgr.task(&id).unwrap();
    assert_eq!(task.id, id);
    assert_eq!(task.title, "Buy milk");
    assert_eq!(task.priority, Priority::High);

    assert!(mgr.delete_task(&id).await.unwrap());
    assert!(mgr.tasks().is_empty());
}

#[tokio::test]
async fn n_adds_give_n_unique_ids() {
    let mut mgr = loaded(InMemoryStore::new()).await;
    for n in 0..50 {
        mgr.add_task(TaskDraft::new(format!("task {n}"))).await.unwrap();
    }
    let ids: HashSet<&TaskId> = mgr.tasks().iter().map(|t| &t.id).collect();
    assert_eq!(mgr.tasks().len(), 50);
    assert_eq!(ids.len(), 50);
}

#[tokio::test]
async fn misses_leave_collection_untouched() {
    let mut mgr = loaded(InMemoryStore::new()).await;
    mgr.add_task(TaskDraft::new("keep")).await.unwrap();
    let before = mgr.tasks().to_vec();
    let ghost = TaskId::from_string("does-not-exist");

    assert!(!mgr.update_task(&ghost, TaskPatch::new().title("x")).await.unwrap());
    assert!(!mgr.delete_task(&ghost).await.unwrap());
    assert_eq!(mgr.toggle_task_completion(&ghost).await.unwrap(), None);
    assert_eq!(mgr.tasks(), before.as_slice());
}

#[tokio::test]
async fn clearing_due_date_via_patch() {
    let mut mgr = loaded(InMemoryStore::new()).await;
    let date = NaiveDate::from_ymd_opt(2026, 11, 2).unwrap();
    let id = mgr
        .add_task(TaskDraft::new("dated").due_date(date))
        .await
        .unwrap();

    mgr.update_task(&id, TaskPatch::new().due_date(None)).await.unwrap();
    assert_eq!(mgr.task(&id).unwrap().due_date, None);
    assert_eq!(mgr.store().get(TASKS_KEY).await.unwrap().unwrap()[0]["dueDate"], json!(null));
}

// ---------------------------------------------------------------------------
// File store persistence
// ---------------------------------------------------------------------------

#[tokio::test]
async fn file_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();

    let id = {
        let store = FileStore::open(dir.path(), "local").unwrap();
        let mut mgr = loaded(store).await;
        let id = mgr
            .add_task(
                TaskDraft::new("Write report")
                    .description("quarterly")
                    .tags(["work", "work"])
                    .subtasks(vec![Subtask::new("outline")]),
            )
            .await
            .unwrap();
        mgr.toggle_task_completion(&id).await.unwrap();
        id
    };

    let store = FileStore::open(dir.path(), "local").unwrap();
    let mgr = loaded(store).await;
    let task = mgr.task(&id).expect("task should be reloaded");
    assert_eq!(task.title, "Write report");
    assert_eq!(task.description, "quarterly");
    assert_eq!(task.tags, vec!["work", "work"]);
    assert_eq!(task.subtasks, vec![Subtask::new("outline")]);
    assert!(task.completed);
}

#[tokio::test]
async fn file_store_document_uses_camel_case() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path(), "local").unwrap();
    let path = store.path().to_path_buf();
    let mut mgr = loaded(store).await;
    mgr.add_task(
        TaskDraft::new("dated").due_date(NaiveDate::from_ymd_opt(2026, 1, 31).unwrap()),
    )
    .await
    .unwrap();

    let raw = std::fs::read_to_string(path).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(doc["tasks"][0]["dueDate"], "2026-01-31");
    assert_eq!(doc["tasks"][0]["priority"], "medium");
}

#[tokio::test]
async fn legacy_records_load_with_defaults() {
    let store = InMemoryStore::with_entries([(
        TASKS_KEY,
        json!([
            { "id": "1700000000000", "title": "old", "dueDate": "" },
            { "id": "1700000000001", "title": "older", "dueDate": "2024-02-29",
              "priority": "high", "tags": ["x"], "completed": true,
              "subtasks": [{ "title": "s", "completed": true }] }
        ]),
    )]);
    let mgr = loaded(store).await;

    let first = &mgr.tasks()[0];
    assert_eq!(first.due_date, None);
    assert_eq!(first.priority, Priority::Medium);
    assert!(first.tags.is_empty());

    let second = &mgr.tasks()[1];
    assert_eq!(second.due_date, NaiveDate::from_ymd_opt(2024, 2, 29));
    assert!(second.subtasks[0].is_completed());
}

#[tokio::test]
async fn two_managers_share_one_store() {
    let store = Arc::new(InMemoryStore::new());
    let mut writer = loaded(Arc::clone(&store)).await;
    writer.add_task(TaskDraft::new("shared")).await.unwrap();

    let reader = loaded(Arc::clone(&store)).await;
    assert_eq!(reader.tasks(), writer.tasks());
}

#[test]
fn unusable_directory_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("not-a-dir");
    std::fs::write(&file, b"x").unwrap();

    let err = FileStore::open(&file, "local").err().unwrap();
    assert!(matches!(err, StorageError::Unavailable(_)));
}

#[tokio::test]
async fn corrupt_stored_value_is_a_codec_error() {
    let store = InMemoryStore::with_entries([(TASKS_KEY, json!({ "not": "a list" }))]);
    let mut mgr = TaskManager::new(store);
    let err = mgr.load_tasks().await.unwrap_err();
    assert!(matches!(err, TaskError::Codec(_)));
    assert!(mgr.tasks().is_empty());
}
