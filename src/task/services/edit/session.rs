//! Edit session: the explicit context shared by the form's sub-states.

use super::holders::{BasicFields, Classification, ContactSelection, SubtaskEditor};
use super::EditError;
use crate::config::BoardConfig;
use crate::task::services::SubtaskWrite;
use crate::task::domain::{Priority, Subtask, Task, TaskData, TaskStatus, parse_date_text};

/// What saving the session will do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditTarget {
    /// Create a new task in the given column.
    Create {
        /// Column the new task starts in.
        status: TaskStatus,
    },
    /// Rewrite an existing task.
    Edit(Task),
}

impl Default for EditTarget {
    fn default() -> Self {
        Self::Create {
            status: TaskStatus::ToDo,
        }
    }
}

/// Per-field validation flags; `true` marks a failing field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    /// Title is blank.
    pub title: bool,
    /// No category is selected.
    pub category: bool,
    /// Due date is blank.
    pub due_date: bool,
}

impl ValidationErrors {
    /// Returns `true` when no field fails.
    #[must_use]
    pub const fn is_clear(self) -> bool {
        !(self.title || self.category || self.due_date)
    }
}

/// State of one create or edit flow.
///
/// The four sub-states are plain fields that form components mutate
/// directly; none of them refers to another. The original subtask snapshot
/// and the edit target are only set by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    target: EditTarget,
    /// Title, description and raw due date.
    pub basic: BasicFields,
    /// Priority and category.
    pub classification: Classification,
    /// Assigned contacts.
    pub contacts: ContactSelection,
    /// Subtasks being edited.
    pub subtasks: SubtaskEditor,
    original_subtasks: Option<Vec<Subtask>>,
    errors: ValidationErrors,
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new(Priority::default())
    }
}

impl EditSession {
    /// Creates an empty create-in-"to-do" session.
    #[must_use]
    pub fn new(default_priority: Priority) -> Self {
        Self {
            target: EditTarget::default(),
            basic: BasicFields::default(),
            classification: Classification::new(default_priority),
            contacts: ContactSelection::default(),
            subtasks: SubtaskEditor::default(),
            original_subtasks: None,
            errors: ValidationErrors::default(),
        }
    }

    /// Creates an empty session using the configured default priority.
    #[must_use]
    pub fn from_config(config: &BoardConfig) -> Self {
        Self::new(config.default_priority)
    }

    /// Returns what saving will do.
    #[must_use]
    pub const fn target(&self) -> &EditTarget {
        &self.target
    }

    /// Returns the task being edited, if this is an edit flow.
    #[must_use]
    pub const fn editing_task(&self) -> Option<&Task> {
        match &self.target {
            EditTarget::Edit(task) => Some(task),
            EditTarget::Create { .. } => None,
        }
    }

    /// Returns the subtasks as stored when the edit started.
    #[must_use]
    pub fn original_subtasks(&self) -> Option<&[Subtask]> {
        self.original_subtasks.as_deref()
    }

    /// Returns the flags set by the last [`Self::validate`].
    #[must_use]
    pub const fn errors(&self) -> ValidationErrors {
        self.errors
    }

    /// Runs every field check, records the flags and returns whether the
    /// session may be saved.
    pub fn validate(&mut self) -> bool {
        self.errors = self.check();
        self.errors.is_clear()
    }

    /// Builds the task described by the session.
    ///
    /// The due date is parsed from the raw text; text that is not a date
    /// yields a task without due date. Contact identifiers are deduplicated.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::Validation`] when the title is blank or no
    /// category is selected.
    pub fn build(&self) -> Result<Task, EditError> {
        let flags = self.check();
        let category = match self.classification.category() {
            Some(category) if !flags.title => category,
            _ => return Err(EditError::Validation(flags)),
        };
        let (id, status) = match &self.target {
            EditTarget::Create { status } => (None, *status),
            EditTarget::Edit(task) => (task.id().cloned(), task.status()),
        };

        Ok(Task::new(TaskData {
            id,
            title: self.basic.title.clone(),
            description: Some(self.basic.description.clone()),
            due_date: parse_date_text(&self.basic.due_date),
            priority: self.classification.priority(),
            status,
            category,
            assigned_to: self.contacts.ids(),
        })?)
    }

    /// Resets every sub-state, the validation flags, the snapshot and the
    /// target. Calling it repeatedly has no further effect.
    pub fn clear(&mut self) {
        self.target = EditTarget::default();
        self.basic = BasicFields::default();
        self.classification.reset();
        self.contacts.reset();
        self.subtasks.reset();
        self.original_subtasks = None;
        self.errors = ValidationErrors::default();
    }

    pub(super) fn begin_create(&mut self, status: TaskStatus) {
        self.clear();
        self.target = EditTarget::Create { status };
    }

    pub(super) fn begin_edit(&mut self, task: Task) {
        self.clear();
        self.target = EditTarget::Edit(task);
    }

    pub(super) fn capture_original_subtasks(&mut self, subtasks: Vec<Subtask>) {
        self.original_subtasks = Some(subtasks);
    }

    /// Turns a create flow into an edit of the stored task. Nothing is
    /// stored under it yet, so the baseline is empty.
    pub(super) fn mark_created(&mut self, task: Task) {
        self.target = EditTarget::Edit(task);
        self.original_subtasks = Some(Vec::new());
    }

    /// Folds a subtask write that reached the store into the editor and the
    /// baseline, so a later save does not repeat it.
    pub(super) fn record_subtask_write(&mut self, write: SubtaskWrite) {
        let baseline = self.original_subtasks.get_or_insert_with(Vec::new);
        match write {
            SubtaskWrite::Deleted(id) => baseline.retain(|subtask| *subtask.id() != id),
            SubtaskWrite::Updated(_) => {}
            SubtaskWrite::Created { pending, stored } => {
                self.subtasks.mark_persisted(&pending, stored.id().clone());
                baseline.push(stored);
            }
        }
    }

    fn check(&self) -> ValidationErrors {
        ValidationErrors {
            title: self.basic.title.trim().is_empty(),
            category: self.classification.category().is_none(),
            due_date: self.basic.due_date.trim().is_empty(),
        }
    }
}
