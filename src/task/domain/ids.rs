//! Identifier types for the task domain.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned identifier of a persisted task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Wraps an identifier returned by the document store.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the identifier as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TaskId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a subtask.
///
/// Subtasks created while a task is being edited carry a client-generated
/// sequence number until the save flow writes them to the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubtaskId {
    /// Client-only placeholder for a subtask that has not been stored.
    Pending(u64),
    /// Identifier assigned by the document store.
    Persisted(String),
}

impl SubtaskId {
    /// Creates a persisted-form identifier.
    #[must_use]
    pub fn persisted(value: impl Into<String>) -> Self {
        Self::Persisted(value.into())
    }

    /// Returns `true` when the identifier was assigned by the store.
    #[must_use]
    pub const fn is_persisted(&self) -> bool {
        matches!(self, Self::Persisted(_))
    }

    /// Returns the store identifier, if any.
    #[must_use]
    pub fn persisted_id(&self) -> Option<&str> {
        match self {
            Self::Persisted(id) => Some(id),
            Self::Pending(_) => None,
        }
    }
}

impl fmt::Display for SubtaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending(sequence) => write!(f, "pending-{sequence}"),
            Self::Persisted(id) => f.write_str(id),
        }
    }
}
