//! `TaskMate`: local task list with a work/break interval timer.

pub mod app;
pub mod config;
pub mod reminder;
pub mod storage;
pub mod tasks;
pub mod theme;
pub mod timer;
