//! Shared data model for `TaskMate`: tasks, their stored JSON form, theme
//! preference values and reminder payloads.

pub mod codec;
pub mod reminder;
pub mod task;
pub mod theme;
