//! Filtering and ordering of task lists for display.
//!
//! These never touch the manager's collection; they return borrowed views.

use std::cmp::Ordering;

use taskmate_proto::task::Task;

/// Which tasks to show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum StatusFilter {
    /// Every task.
    #[default]
    All,
    /// Tasks not yet completed.
    Pending,
    /// Completed tasks only.
    Completed,
}

impl StatusFilter {
    /// Returns `true` if `task` passes this filter.
    #[must_use]
    pub const fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Pending => !task.completed,
            Self::Completed => task.completed,
        }
    }
}

/// How to order the displayed tasks. Every order is stable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum SortOrder {
    /// Creation order.
    #[default]
    Insertion,
    /// Earliest due date first; undated tasks last.
    DueDate,
    /// High, then medium, then low.
    Priority,
    /// Case-insensitive comparison of the comma-joined tag list.
    Tags,
}

/// Filters and orders `tasks` for display.
#[must_use]
pub fn select(tasks: &[Task], filter: StatusFilter, order: SortOrder) -> Vec<&Task> {
    let mut selected: Vec<&Task> = tasks.iter().filter(|t| filter.matches(t)).collect();
    match order {
        SortOrder::Insertion => {}
        SortOrder::DueDate => selected.sort_by(|a, b| match (a.due_date, b.due_date) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }),
        SortOrder::Priority => selected.sort_by_key(|t| t.priority.rank()),
        SortOrder::Tags => selected.sort_by_cached_key(|t| t.tags.join(",").to_lowercase()),
    }
    selected
}

/// Splits comma-separated tag input, trimming whitespace and dropping empty
/// entries. Duplicates are kept.
#[must_use]
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}
