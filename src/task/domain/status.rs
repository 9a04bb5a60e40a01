//! Board status columns and the task classification enums.

use super::{ParseCategoryError, ParsePriorityError, ParseTaskStatusError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status column a task belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Work has not started.
    ToDo,
    /// Work is under way.
    InProgress,
    /// Work is waiting on feedback from someone else.
    AwaitFeedback,
    /// Work is finished.
    Done,
}

impl TaskStatus {
    /// Every status in board column order.
    pub const ALL: [Self; 4] = [Self::ToDo, Self::InProgress, Self::AwaitFeedback, Self::Done];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ToDo => "to-do",
            Self::InProgress => "in-progress",
            Self::AwaitFeedback => "await-feedback",
            Self::Done => "done",
        }
    }

    /// Returns the identifier of the drop container rendering this column.
    #[must_use]
    pub const fn container_id(self) -> &'static str {
        match self {
            Self::ToDo => "to-do-list",
            Self::InProgress => "in-progress-list",
            Self::AwaitFeedback => "await-feedback-list",
            Self::Done => "done-list",
        }
    }

    /// Maps a drop container identifier back to its status.
    ///
    /// Returns `None` for containers that are not board columns.
    #[must_use]
    pub fn from_container(container_id: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.container_id() == container_id)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "to-do" => Ok(Self::ToDo),
            "in-progress" => Ok(Self::InProgress),
            "await-feedback" => Ok(Self::AwaitFeedback),
            "done" => Ok(Self::Done),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

/// Task urgency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    /// Can wait.
    Low,
    /// Normal urgency.
    #[default]
    Medium,
    /// Needs attention first.
    Urgent,
}

impl Priority {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::Urgent => "urgent",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Priority {
    type Error = ParsePriorityError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "urgent" => Ok(Self::Urgent),
            _ => Err(ParsePriorityError(value.to_owned())),
        }
    }
}

/// Kind of work a task represents.
///
/// The default only fills in for stored tasks that carry no category; the
/// edit form still requires an explicit choice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// Engineering work with no direct user-facing story.
    #[default]
    Technical,
    /// A user story.
    UserStory,
}

impl Category {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Technical => "technical",
            Self::UserStory => "user-story",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Category {
    type Error = ParseCategoryError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "technical" => Ok(Self::Technical),
            "user-story" => Ok(Self::UserStory),
            _ => Err(ParseCategoryError(value.to_owned())),
        }
    }
}
