//! Integration tests for host startup and composition.
//!
//! Builds `App` from an `AppConfig` pointing at a temporary data directory
//! and checks that tasks and the theme preference share one document and
//! survive a restart.
//!
//! Verification command: `cargo test --test host_startup`

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::path::Path;

use taskmate::app::{App, AppError};
use taskmate::config::AppConfig;
use taskmate::storage::StorageError;
use taskmate::tasks::{SortOrder, StatusFilter, select};
use taskmate::theme::ThemePolicy;
use taskmate_proto::task::{Priority, TaskDraft, TaskPatch};
use taskmate_proto::theme::Theme;

fn config_in(dir: &Path) -> AppConfig {
    AppConfig {
        data_dir: Some(dir.to_path_buf()),
        ..AppConfig::default()
    }
}

#[tokio::test]
async fn fresh_directory_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let app = App::open(&config_in(dir.path())).await.unwrap();

    assert!(app.tasks().tasks().is_empty());
    assert_eq!(app.theme(), Theme::Light);
    assert!(!app.timer().is_running());
    assert_eq!(app.timer().display(), "25:00");
}

#[tokio::test]
async fn restart_restores_tasks_and_theme() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    let id = {
        let mut app = App::open(&config).await.unwrap();
        let id = app
            .add_task(TaskDraft::new("Buy milk").priority(Priority::Low))
            .await
            .unwrap();
        app.edit_task(&id.as_str()[..8], TaskPatch::new().tags(["home"]))
            .await
            .unwrap();
        app.toggle_theme().await.unwrap();
        id
    };

    let app = App::open(&config).await.unwrap();
    let task = app.tasks().task(&id).unwrap();
    assert_eq!(task.title, "Buy milk");
    assert_eq!(task.tags, vec!["home"]);
    assert_eq!(app.theme(), Theme::Dark);
}

#[tokio::test]
async fn namespaces_are_isolated() {
    let dir = tempfile::tempdir().unwrap();
    let work = AppConfig {
        namespace: "work".to_string(),
        ..config_in(dir.path())
    };

    let mut app = App::open(&work).await.unwrap();
    app.add_task(TaskDraft::new("standup")).await.unwrap();

    let personal = App::open(&config_in(dir.path())).await.unwrap();
    assert!(personal.tasks().tasks().is_empty());
    assert!(dir.path().join("work.json").exists());
}

#[tokio::test]
async fn invalid_namespace_fails_at_startup() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig {
        namespace: "../escape".to_string(),
        ..config_in(dir.path())
    };
    let err = App::open(&config).await.err().unwrap();
    assert!(matches!(err, AppError::Storage(StorageError::Unavailable(_))));
}

#[tokio::test]
async fn fixed_theme_ignores_stored_preference() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut app = App::open(&config_in(dir.path())).await.unwrap();
        app.toggle_theme().await.unwrap();
    }

    let config = AppConfig {
        theme_policy: ThemePolicy::Fixed(Theme::Light),
        ..config_in(dir.path())
    };
    let mut app = App::open(&config).await.unwrap();
    assert_eq!(app.theme(), Theme::Light);
    assert_eq!(app.toggle_theme().await.unwrap(), Theme::Light);
}

#[tokio::test]
async fn pending_view_after_completion() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = App::open(&config_in(dir.path())).await.unwrap();
    let done = app.add_task(TaskDraft::new("done")).await.unwrap();
    app.add_task(TaskDraft::new("open").priority(Priority::High))
        .await
        .unwrap();
    app.toggle_task(done.as_str()).await.unwrap();

    let pending = select(app.tasks().tasks(), StatusFilter::Pending, SortOrder::Priority);
    let titles: Vec<&str> = pending.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, ["open"]);
}

#[tokio::test]
async fn blank_titles_are_rejected_by_the_host() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = App::open(&config_in(dir.path())).await.unwrap();
    let id = app.add_task(TaskDraft::new("real")).await.unwrap();

    assert!(matches!(
        app.add_task(TaskDraft::new("")).await,
        Err(AppError::EmptyTitle)
    ));
    assert!(matches!(
        app.edit_task(id.as_str(), TaskPatch::new().title("  ")).await,
        Err(AppError::EmptyTitle)
    ));
    assert_eq!(app.tasks().task(&id).unwrap().title, "real");
}
