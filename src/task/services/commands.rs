//! Task and subtask write operations shared by the board views.
//!
//! Batch operations issue one store call at a time, each awaited before the
//! next. A failure stops the batch and leaves earlier writes in place.

use crate::store::EntityStore;
use crate::store::ports::{DocumentStore, StoreReadError, StoreWriteError};
use crate::task::domain::{Subtask, SubtaskDiff, SubtaskId, SubtaskUpsert, TaskId};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Service-level errors for task commands.
#[derive(Debug, Error)]
pub enum TaskCommandError {
    /// A store write failed.
    #[error(transparent)]
    Write(#[from] StoreWriteError),
    /// A store read failed.
    #[error(transparent)]
    Read(#[from] StoreReadError),
    /// The task has not been created in the store yet.
    #[error("task has not been persisted")]
    TaskNotPersisted,
    /// The subtask has not been created in the store yet.
    #[error("subtask {0} has not been persisted")]
    SubtaskNotPersisted(SubtaskId),
}

/// Result type for task command operations.
pub type TaskCommandResult<T> = Result<T, TaskCommandError>;

/// Counts of writes issued by [`TaskCommandService::sync_subtasks`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubtaskSyncReport {
    /// Subtasks removed from the store.
    pub deleted: usize,
    /// Stored subtasks rewritten.
    pub updated: usize,
    /// New subtasks created.
    pub created: usize,
}

/// One subtask write the store accepted during a sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubtaskWrite {
    /// A stored subtask was removed.
    Deleted(SubtaskId),
    /// A stored subtask was rewritten.
    Updated(SubtaskId),
    /// A pending subtask was created.
    Created {
        /// Identifier the subtask had before the write.
        pending: SubtaskId,
        /// The subtask under its store-assigned identifier.
        stored: Subtask,
    },
}

/// Task command service.
pub struct TaskCommandService<D> {
    store: Arc<EntityStore<D>>,
}

impl<D> Clone for TaskCommandService<D> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<D: DocumentStore> TaskCommandService<D> {
    /// Creates a command service over the entity store.
    #[must_use]
    pub const fn new(store: Arc<EntityStore<D>>) -> Self {
        Self { store }
    }

    /// Creates every subtask under `task_id`, in order.
    ///
    /// Returns the subtasks carrying their new persisted identifiers.
    ///
    /// # Errors
    ///
    /// Returns the first store write error; subtasks created before it stay.
    pub async fn save_subtasks(
        &self,
        task_id: &TaskId,
        subtasks: &[Subtask],
    ) -> Result<Vec<Subtask>, StoreWriteError> {
        let mut saved = Vec::with_capacity(subtasks.len());
        for subtask in subtasks {
            let id = self.store.create_subtask(task_id, subtask).await?;
            saved.push(subtask.clone().with_id(id));
        }
        debug!(%task_id, count = saved.len(), "created subtasks");
        Ok(saved)
    }

    /// Deletes every persisted subtask in `subtasks`, in order.
    ///
    /// Pending subtasks are skipped. Returns the number of deletions issued.
    ///
    /// # Errors
    ///
    /// Returns the first store write error; deletions before it stay.
    pub async fn delete_subtasks(
        &self,
        task_id: &TaskId,
        subtasks: &[Subtask],
    ) -> Result<usize, StoreWriteError> {
        let mut deleted = 0;
        for id in subtasks.iter().filter_map(|subtask| subtask.id().persisted_id()) {
            self.store.delete_subtask(task_id, id).await?;
            deleted += 1;
        }
        debug!(%task_id, deleted, "deleted subtasks");
        Ok(deleted)
    }

    /// Reconciles the stored subtasks of `task_id` with an edited list.
    ///
    /// Deletions run first, then one update or create per current subtask
    /// in list order.
    ///
    /// # Errors
    ///
    /// Returns the first store write error; writes before it stay.
    pub async fn sync_subtasks(
        &self,
        task_id: &TaskId,
        original: &[Subtask],
        current: &[Subtask],
    ) -> Result<SubtaskSyncReport, StoreWriteError> {
        self.sync_subtasks_observed(task_id, original, current, |_| {})
            .await
    }

    /// Same as [`Self::sync_subtasks`], reporting every accepted write to
    /// `on_write` as soon as the store confirms it.
    ///
    /// # Errors
    ///
    /// Returns the first store write error; `on_write` has seen every write
    /// before it.
    pub async fn sync_subtasks_observed<F>(
        &self,
        task_id: &TaskId,
        original: &[Subtask],
        current: &[Subtask],
        mut on_write: F,
    ) -> Result<SubtaskSyncReport, StoreWriteError>
    where
        F: FnMut(SubtaskWrite) + Send,
    {
        let (deleted, upserts) = SubtaskDiff::between(original, current).into_parts();
        let mut report = SubtaskSyncReport::default();

        for subtask in &deleted {
            if let Some(id) = subtask.id().persisted_id() {
                self.store.delete_subtask(task_id, id).await?;
                report.deleted += 1;
                on_write(SubtaskWrite::Deleted(subtask.id().clone()));
            }
        }

        for upsert in &upserts {
            match upsert {
                SubtaskUpsert::Update(subtask) => {
                    if let Some(id) = subtask.id().persisted_id() {
                        self.store.update_subtask(task_id, id, subtask).await?;
                        report.updated += 1;
                        on_write(SubtaskWrite::Updated(subtask.id().clone()));
                    }
                }
                SubtaskUpsert::Create(subtask) => {
                    let id = self.store.create_subtask(task_id, subtask).await?;
                    report.created += 1;
                    on_write(SubtaskWrite::Created {
                        pending: subtask.id().clone(),
                        stored: subtask.clone().with_id(id),
                    });
                }
            }
        }
        debug!(
            %task_id,
            deleted = report.deleted,
            updated = report.updated,
            created = report.created,
            "synchronised subtasks"
        );
        Ok(report)
    }

    /// Flips the completion flag of a stored subtask and persists it.
    ///
    /// # Errors
    ///
    /// Returns [`TaskCommandError::SubtaskNotPersisted`] for pending
    /// subtasks, or the store write error.
    pub async fn toggle_subtask(
        &self,
        task_id: &TaskId,
        subtask: &Subtask,
    ) -> TaskCommandResult<Subtask> {
        let id = subtask
            .id()
            .persisted_id()
            .ok_or_else(|| TaskCommandError::SubtaskNotPersisted(subtask.id().clone()))?;
        let mut toggled = subtask.clone();
        toggled.toggle();
        self.store.update_subtask(task_id, id, &toggled).await?;
        Ok(toggled)
    }

    /// Deletes a task together with all of its stored subtasks.
    ///
    /// Subtasks are read once and deleted one by one before the task
    /// document.
    ///
    /// # Errors
    ///
    /// Returns the read error if the subtasks cannot be listed, or the first
    /// write error; the task document is kept when a subtask deletion fails.
    pub async fn delete_task(&self, task_id: &TaskId) -> TaskCommandResult<()> {
        let subtasks = self.store.fetch_subtasks(task_id).await?;
        self.delete_subtasks(task_id, &subtasks).await?;
        self.store.delete_task(task_id).await?;
        info!(%task_id, subtasks = subtasks.len(), "deleted task");
        Ok(())
    }
}
