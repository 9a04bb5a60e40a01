//! Drag-and-drop status transitions.
//!
//! A drop is applied to the caller's board immediately. When the task changed
//! column, the status write runs in the background; if it fails the board is
//! left as dropped and the next task snapshot restores the stored state.

use super::{TaskCommandError, TaskCommandResult};
use crate::store::EntityStore;
use crate::store::ports::{DocumentStore, StoreWriteResult};
use crate::task::domain::{BoardBuckets, Task, TaskId, TaskStatus};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Reorder or transfer gesture reported by the board view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropEvent {
    /// Container the item was dragged out of.
    pub previous_container: String,
    /// Container the item was dropped into.
    pub container: String,
    /// Index of the item in its source container.
    pub previous_index: usize,
    /// Index the item was dropped at.
    pub current_index: usize,
}

impl DropEvent {
    /// Creates a drop descriptor.
    #[must_use]
    pub fn new(
        previous_container: impl Into<String>,
        container: impl Into<String>,
        previous_index: usize,
        current_index: usize,
    ) -> Self {
        Self {
            previous_container: previous_container.into(),
            container: container.into(),
            previous_index,
            current_index,
        }
    }

    /// Creates a drop between two status columns.
    #[must_use]
    pub fn between(
        from: TaskStatus,
        to: TaskStatus,
        previous_index: usize,
        current_index: usize,
    ) -> Self {
        Self::new(
            from.container_id(),
            to.container_id(),
            previous_index,
            current_index,
        )
    }
}

/// Gesture phase of the coordinator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragPhase {
    /// No gesture in progress.
    #[default]
    Idle,
    /// An item is being dragged.
    Dragging {
        /// Container the drag started in.
        container: String,
        /// Index of the dragged item.
        index: usize,
    },
    /// The last gesture ended with a drop.
    Settled,
}

/// Result of handling a drop.
#[derive(Debug)]
pub enum DropOutcome {
    /// The drop did not map onto board columns, or pointed at no item; the
    /// board was not changed.
    Ignored,
    /// The task was moved within one column. Nothing is persisted.
    Reordered {
        /// Column that was reordered.
        status: TaskStatus,
    },
    /// The task was moved to another column.
    Transferred {
        /// Task as it now sits in the destination column.
        task: Task,
        /// Column the task left.
        from: TaskStatus,
        /// Background status write, when one was issued.
        persistence: Option<JoinHandle<StoreWriteResult<()>>>,
    },
}

/// Result of [`DragDropCoordinator::change_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    /// The task already had the requested status.
    Unchanged,
    /// The new status was written.
    Persisted,
}

/// Drag-Drop Status Coordinator.
pub struct DragDropCoordinator<D>
where
    D: DocumentStore + 'static,
{
    store: Arc<EntityStore<D>>,
    phase: DragPhase,
}

impl<D> DragDropCoordinator<D>
where
    D: DocumentStore + 'static,
{
    /// Creates an idle coordinator.
    #[must_use]
    pub const fn new(store: Arc<EntityStore<D>>) -> Self {
        Self {
            store,
            phase: DragPhase::Idle,
        }
    }

    /// Returns the current gesture phase.
    #[must_use]
    pub const fn phase(&self) -> &DragPhase {
        &self.phase
    }

    /// Records the start of a drag.
    ///
    /// Returns `false` and keeps the current gesture when one is already
    /// in progress.
    pub fn begin_drag(&mut self, container: impl Into<String>, index: usize) -> bool {
        if matches!(self.phase, DragPhase::Dragging { .. }) {
            warn!("drag started while another drag is in progress");
            return false;
        }
        self.phase = DragPhase::Dragging {
            container: container.into(),
            index,
        };
        true
    }

    /// Abandons the current gesture without a drop.
    pub fn cancel_drag(&mut self) {
        self.phase = DragPhase::Idle;
    }

    /// Applies a drop to `board`.
    ///
    /// Drops onto unknown containers are ignored. Drops within one column
    /// reorder it. Drops across columns move the task immediately and, when
    /// its status differs from the destination's, persist the new status in
    /// a background task; `on_persisted` runs after that write succeeds.
    ///
    /// Cross-column drops must be handled from within a Tokio runtime.
    pub fn handle_drop<F>(
        &mut self,
        board: &mut BoardBuckets,
        event: &DropEvent,
        on_persisted: F,
    ) -> DropOutcome
    where
        F: FnOnce(&Task) + Send + 'static,
    {
        self.phase = DragPhase::Settled;

        let (Some(from), Some(to)) = (
            TaskStatus::from_container(&event.previous_container),
            TaskStatus::from_container(&event.container),
        ) else {
            warn!(
                from = %event.previous_container,
                to = %event.container,
                "drop onto an unmapped container ignored"
            );
            return DropOutcome::Ignored;
        };

        if from == to {
            if !move_within(board.bucket_mut(to), event.previous_index, event.current_index) {
                return DropOutcome::Ignored;
            }
            debug!(status = %to, "reordered column");
            return DropOutcome::Reordered { status: to };
        }

        let Some((task, previous_status)) =
            transfer_between(board, from, to, event.previous_index, event.current_index)
        else {
            return DropOutcome::Ignored;
        };

        let persistence = match task.id() {
            Some(task_id) if previous_status != to => {
                Some(self.persist_status(task_id.clone(), task.clone(), on_persisted))
            }
            Some(_) => None,
            None => {
                warn!(
                    title = task.title(),
                    "moved task has no store identifier; status not persisted"
                );
                None
            }
        };

        DropOutcome::Transferred {
            task,
            from,
            persistence,
        }
    }

    fn persist_status<F>(
        &self,
        task_id: TaskId,
        task: Task,
        on_persisted: F,
    ) -> JoinHandle<StoreWriteResult<()>>
    where
        F: FnOnce(&Task) + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let status = task.status();
        tokio::spawn(async move {
            let result = store.update_task_status(&task_id, status).await;
            match &result {
                Ok(()) => {
                    info!(%task_id, %status, "persisted dropped task status");
                    on_persisted(&task);
                }
                Err(error) => {
                    error!(
                        %task_id,
                        %status,
                        %error,
                        "failed to persist dropped task status; board keeps the optimistic move"
                    );
                }
            }
            result
        })
    }

    /// Changes a task's status outside of a drag gesture.
    ///
    /// Does nothing when the task already has `status`. Otherwise writes the
    /// status and calls `on_reload` once the write has resolved.
    ///
    /// # Errors
    ///
    /// Returns [`TaskCommandError::TaskNotPersisted`] for tasks without a
    /// store identifier, or [`TaskCommandError::Write`] when the write fails;
    /// `on_reload` is not called in either case.
    pub async fn change_status<F>(
        &self,
        task: &Task,
        status: TaskStatus,
        on_reload: F,
    ) -> TaskCommandResult<StatusChange>
    where
        F: FnOnce(),
    {
        if task.status() == status {
            return Ok(StatusChange::Unchanged);
        }
        let task_id = task.id().ok_or(TaskCommandError::TaskNotPersisted)?;
        self.store.update_task_status(task_id, status).await?;
        info!(%task_id, from = %task.status(), to = %status, "changed task status");
        on_reload();
        Ok(StatusChange::Persisted)
    }
}

/// Moves an item inside one list, clamping the target index.
fn move_within(items: &mut Vec<Task>, from: usize, to: usize) -> bool {
    if from >= items.len() {
        return false;
    }
    let item = items.remove(from);
    let target = to.min(items.len());
    items.insert(target, item);
    true
}

/// Moves an item between two columns and gives it the destination status.
///
/// Returns the moved task and the status it had before the move.
fn transfer_between(
    board: &mut BoardBuckets,
    from: TaskStatus,
    to: TaskStatus,
    previous_index: usize,
    current_index: usize,
) -> Option<(Task, TaskStatus)> {
    let source = board.bucket_mut(from);
    if previous_index >= source.len() {
        return None;
    }
    let mut task = source.remove(previous_index);
    let previous_status = task.status();
    task.set_status(to);

    let target = board.bucket_mut(to);
    let index = current_index.min(target.len());
    target.insert(index, task.clone());
    Some((task, previous_status))
}
