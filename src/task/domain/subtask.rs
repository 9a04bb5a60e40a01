//! Subtask entity owned by a task.

use super::{SubtaskId, TaskDomainError};
use serde::{Deserialize, Serialize};

/// A checklist item belonging to exactly one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    id: SubtaskId,
    text: String,
    completed: bool,
}

impl Subtask {
    /// Creates a subtask with trimmed text.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptySubtaskText`] when the text is empty
    /// after trimming.
    pub fn new(
        id: SubtaskId,
        text: impl AsRef<str>,
        completed: bool,
    ) -> Result<Self, TaskDomainError> {
        Ok(Self {
            id,
            text: normalize_text(text.as_ref())?,
            completed,
        })
    }

    /// Creates a not-yet-stored, uncompleted subtask.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptySubtaskText`] when the text is empty
    /// after trimming.
    pub fn pending(sequence: u64, text: impl AsRef<str>) -> Result<Self, TaskDomainError> {
        Self::new(SubtaskId::Pending(sequence), text, false)
    }

    /// Returns the subtask identifier.
    #[must_use]
    pub const fn id(&self) -> &SubtaskId {
        &self.id
    }

    /// Returns the subtask text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns whether the subtask is completed.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.completed
    }

    /// Returns a copy carrying the given identifier.
    #[must_use]
    pub fn with_id(self, id: SubtaskId) -> Self {
        Self { id, ..self }
    }

    /// Replaces the text.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptySubtaskText`] and leaves the subtask
    /// unchanged when the new text is empty after trimming.
    pub fn rename(&mut self, text: impl AsRef<str>) -> Result<(), TaskDomainError> {
        self.text = normalize_text(text.as_ref())?;
        Ok(())
    }

    /// Sets the completion flag.
    pub const fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
    }

    /// Flips the completion flag.
    pub const fn toggle(&mut self) {
        self.completed = !self.completed;
    }
}

fn normalize_text(raw: &str) -> Result<String, TaskDomainError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TaskDomainError::EmptySubtaskText);
    }
    Ok(trimmed.to_owned())
}
