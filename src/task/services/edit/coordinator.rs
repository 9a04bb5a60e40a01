//! Orchestration of loading and saving edit sessions.

use super::{EditError, EditSession};
use crate::contact::domain::Contact;
use crate::store::EntityStore;
use crate::store::ports::DocumentStore;
use crate::task::domain::{Task, TaskStatus, format_calendar_date};
use crate::task::services::TaskCommandService;
use std::sync::Arc;
use tracing::{debug, info};

/// Composite Task-Edit Coordinator.
///
/// Holds no session state itself; every operation receives the session it
/// works on.
pub struct TaskEditCoordinator<D> {
    store: Arc<EntityStore<D>>,
    commands: TaskCommandService<D>,
}

impl<D: DocumentStore> TaskEditCoordinator<D> {
    /// Creates a coordinator over the entity store.
    #[must_use]
    pub fn new(store: Arc<EntityStore<D>>) -> Self {
        Self {
            commands: TaskCommandService::new(Arc::clone(&store)),
            store,
        }
    }

    /// Starts a create flow for a task in `status`, discarding any previous
    /// session state.
    pub fn begin_create(&self, session: &mut EditSession, status: TaskStatus) {
        session.begin_create(status);
        debug!(%status, "started task creation");
    }

    /// Starts an edit flow for `task`.
    ///
    /// Fills the form fields from the task, resolves assigned contacts
    /// against `contacts` (unknown identifiers are dropped), and for stored
    /// tasks reads the subtasks and keeps them as the diff baseline.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::Read`] when the subtasks cannot be read; the
    /// other fields stay loaded.
    pub async fn load(
        &self,
        session: &mut EditSession,
        task: &Task,
        contacts: &[Contact],
    ) -> Result<(), EditError> {
        session.begin_edit(task.clone());
        session.basic.title = task.title().to_owned();
        session.basic.description = task.description().unwrap_or_default().to_owned();
        session.basic.due_date = task.due_date().map(format_calendar_date).unwrap_or_default();
        session.classification.set_priority(task.priority());
        session.classification.set_category(Some(task.category()));

        for contact_id in task.assigned_to() {
            let Some(contact) = contacts.iter().find(|contact| contact.id() == contact_id) else {
                debug!(%contact_id, "assigned contact is unknown; dropped from the form");
                continue;
            };
            session.contacts.select(contact.clone());
        }

        if let Some(task_id) = task.id() {
            let subtasks = self.store.fetch_subtasks(task_id).await?;
            session.subtasks.load(subtasks.clone());
            session.capture_original_subtasks(subtasks);
            debug!(%task_id, "loaded task into the edit session");
        }
        Ok(())
    }

    /// Validates and persists the session, then clears it.
    ///
    /// Existing tasks are rewritten and their subtasks reconciled against the
    /// baseline captured by [`Self::load`]. New tasks are created first and
    /// every subtask is then created under the returned identifier. Subtask
    /// writes are issued one at a time.
    ///
    /// Every field of an existing task is rewritten from the session,
    /// including the status captured when it was loaded; a status change made
    /// on the board while the form was open is overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::Validation`] with every failing flag when the
    /// form is incomplete, or the first store error. The session is kept on
    /// error and already records the writes that went through: a created
    /// task turns the session into an edit of it, and created or deleted
    /// subtasks move into the baseline. Saving again resumes without
    /// duplicating them.
    pub async fn save(&self, session: &mut EditSession) -> Result<Task, EditError> {
        if !session.validate() {
            return Err(EditError::Validation(session.errors()));
        }
        let draft = session.build()?;

        let (task, task_id) = if let Some(task_id) = draft.id().cloned() {
            self.store.update_task(&task_id, &draft).await?;
            (draft, task_id)
        } else {
            let task_id = self.store.create_task(&draft).await?;
            info!(%task_id, "created task");
            let created = draft.with_id(task_id.clone());
            session.mark_created(created.clone());
            (created, task_id)
        };

        let original = session.original_subtasks().unwrap_or_default().to_vec();
        let current = session.subtasks.items().to_vec();
        let report = self
            .commands
            .sync_subtasks_observed(&task_id, &original, &current, |write| {
                session.record_subtask_write(write);
            })
            .await?;
        info!(
            %task_id,
            deleted = report.deleted,
            updated = report.updated,
            created = report.created,
            "saved task"
        );

        session.clear();
        Ok(task)
    }
}
