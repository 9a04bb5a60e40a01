//! Tasks, subtasks and the live board.
//!
//! The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]: tasks, subtasks, due dates, status buckets,
//!   the subtask diff and the board summary
//! - Orchestration services in [`services`]: the task list distributor, the
//!   drag-and-drop coordinator, task commands and composite editing
//!
//! Store access goes through [`crate::store::EntityStore`].

pub mod domain;
pub mod services;

#[cfg(test)]
mod tests;
