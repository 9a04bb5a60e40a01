//! Application services for the task board.

mod commands;
mod distributor;
mod drag_drop;
pub mod edit;

pub use commands::{
    SubtaskSyncReport, SubtaskWrite, TaskCommandError, TaskCommandResult, TaskCommandService,
};
pub use distributor::{BoardEvent, DistributorError, SubtaskProgress, TaskListDistributor};
pub use drag_drop::{DragDropCoordinator, DragPhase, DropEvent, DropOutcome, StatusChange};
pub use edit::{EditError, EditSession, TaskEditCoordinator};
