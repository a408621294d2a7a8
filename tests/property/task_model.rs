//! Property-based tests for the task model and stored format.
//!
//! Uses proptest to verify:
//! 1. A patch touching one field leaves every other field alone.
//! 2. Drafts fill omitted fields with the documented defaults.
//! 3. Any task survives the stored JSON format unchanged.
//! 4. Arbitrary JSON never makes `decode_tasks` panic.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::NaiveDate;
use proptest::prelude::*;
use serde_json::{Value, json};
use taskmate_proto::codec::{decode_tasks, encode_tasks};
use taskmate_proto::task::{Priority, Subtask, Task, TaskDraft, TaskId, TaskPatch};
use taskmate_proto::theme::Theme;

// --- Strategies ---

fn arb_priority() -> impl Strategy<Value = Priority> {
    prop_oneof![Just(Priority::High), Just(Priority::Medium), Just(Priority::Low)]
}

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (1970i32..2100, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

/// Conventional `{title, completed}` entries, entries carrying extra
/// fields, and entries of any other shape.
fn arb_subtask() -> impl Strategy<Value = Subtask> {
    prop_oneof![
        (".{0,20}", any::<bool>()).prop_map(|(title, completed)| {
            Subtask::from_value(json!({ "title": title, "completed": completed }))
        }),
        (".{0,20}", "[a-z0-9]{1,8}", arb_priority()).prop_map(|(title, id, priority)| {
            Subtask::from_value(json!({ "id": id, "title": title, "priority": priority }))
        }),
        arb_json().prop_map(Subtask::from_value),
    ]
}

fn arb_task() -> impl Strategy<Value = Task> {
    (
        "[a-f0-9-]{1,36}",
        ".{0,40}",
        ".{0,80}",
        proptest::option::of(arb_date()),
        arb_priority(),
        prop::collection::vec("[a-z]{1,8}", 0..5),
        any::<bool>(),
        prop::collection::vec(arb_subtask(), 0..4),
    )
        .prop_map(
            |(id, title, description, due_date, priority, tags, completed, subtasks)| Task {
                id: TaskId::from_string(id),
                title,
                description,
                due_date,
                priority,
                tags,
                completed,
                subtasks,
            },
        )
}

/// Patches that set exactly one field.
fn arb_single_field_patch() -> impl Strategy<Value = TaskPatch> {
    prop_oneof![
        ".{0,40}".prop_map(|t| TaskPatch::new().title(t)),
        ".{0,40}".prop_map(|d| TaskPatch::new().description(d)),
        proptest::option::of(arb_date()).prop_map(|d| TaskPatch::new().due_date(d)),
        arb_priority().prop_map(|p| TaskPatch::new().priority(p)),
        prop::collection::vec("[a-z]{1,8}", 0..5).prop_map(|t| TaskPatch::new().tags(t)),
        prop::collection::vec(arb_subtask(), 0..4).prop_map(|s| TaskPatch::new().subtasks(s)),
        any::<bool>().prop_map(|c| TaskPatch {
            completed: Some(c),
            ..TaskPatch::default()
        }),
    ]
}

/// Fields a patch did not name, blanked so two tasks can be compared on
/// them alone.
fn untouched_fields(task: &Task, patch: &TaskPatch) -> Task {
    let mut t = task.clone();
    if patch.title.is_some() {
        t.title.clear();
    }
    if patch.description.is_some() {
        t.description.clear();
    }
    if patch.due_date.is_some() {
        t.due_date = None;
    }
    if patch.priority.is_some() {
        t.priority = Priority::Medium;
    }
    if patch.tags.is_some() {
        t.tags.clear();
    }
    if patch.completed.is_some() {
        t.completed = false;
    }
    if patch.subtasks.is_some() {
        t.subtasks.clear();
    }
    t
}

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        ".{0,10}".prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::hash_map("[a-zA-Z]{1,8}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

// --- Properties ---

proptest! {
    #[test]
    fn single_field_patch_touches_only_that_field(
        task in arb_task(),
        patch in arb_single_field_patch(),
    ) {
        let mut patched = task.clone();
        patched.apply(patch.clone());

        prop_assert_eq!(&patched.id, &task.id);
        prop_assert_eq!(untouched_fields(&patched, &patch), untouched_fields(&task, &patch));
        if let Some(title) = &patch.title {
            prop_assert_eq!(&patched.title, title);
        }
        if let Some(priority) = patch.priority {
            prop_assert_eq!(patched.priority, priority);
        }
        if let Some(due) = patch.due_date {
            prop_assert_eq!(patched.due_date, due);
        }
        if let Some(subtasks) = &patch.subtasks {
            prop_assert_eq!(&patched.subtasks, subtasks);
        }
    }

    #[test]
    fn empty_patch_is_identity(task in arb_task()) {
        let mut patched = task.clone();
        patched.apply(TaskPatch::new());
        prop_assert_eq!(patched, task);
    }

    #[test]
    fn draft_defaults(title in ".{0,40}") {
        let task = Task::from_draft(TaskId::new(), TaskDraft::new(title.clone()));
        prop_assert_eq!(task.title, title);
        prop_assert_eq!(task.description, "");
        prop_assert_eq!(task.due_date, None);
        prop_assert_eq!(task.priority, Priority::Medium);
        prop_assert!(task.tags.is_empty());
        prop_assert!(!task.completed);
        prop_assert!(task.subtasks.is_empty());
    }

    #[test]
    fn stored_format_preserves_tasks(tasks in prop::collection::vec(arb_task(), 0..8)) {
        let value = encode_tasks(&tasks).unwrap();
        prop_assert_eq!(decode_tasks(value).unwrap(), tasks);
    }

    #[test]
    fn decode_never_panics(value in arb_json()) {
        let _ = decode_tasks(value);
    }

    #[test]
    fn generated_ids_are_distinct(n in 1usize..200) {
        let ids: std::collections::HashSet<TaskId> = (0..n).map(|_| TaskId::new()).collect();
        prop_assert_eq!(ids.len(), n);
    }

    #[test]
    fn theme_toggle_is_an_involution(dark in any::<bool>()) {
        let theme = if dark { Theme::Dark } else { Theme::Light };
        prop_assert_ne!(theme.toggled(), theme);
        prop_assert_eq!(theme.toggled().toggled(), theme);
    }
}
