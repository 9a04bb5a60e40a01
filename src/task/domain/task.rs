//! Task aggregate root.

use super::{Category, Priority, TaskDomainError, TaskId, TaskStatus};
use crate::contact::domain::ContactId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: Option<TaskId>,
    title: String,
    description: Option<String>,
    due_date: Option<NaiveDate>,
    priority: Priority,
    status: TaskStatus,
    category: Category,
    assigned_to: BTreeSet<ContactId>,
}

/// Parameter object for constructing a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskData {
    /// Store identifier; `None` until the task has been created.
    pub id: Option<TaskId>,
    /// Title, trimmed on construction.
    pub title: String,
    /// Optional description; blank descriptions are dropped.
    pub description: Option<String>,
    /// Normalised due date.
    pub due_date: Option<NaiveDate>,
    /// Urgency.
    pub priority: Priority,
    /// Board column.
    pub status: TaskStatus,
    /// Kind of work.
    pub category: Category,
    /// Identifiers of assigned contacts.
    pub assigned_to: BTreeSet<ContactId>,
}

impl Task {
    /// Creates a task, trimming its title and description.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] when the title is empty after
    /// trimming.
    pub fn new(data: TaskData) -> Result<Self, TaskDomainError> {
        let title = data.title.trim();
        if title.is_empty() {
            return Err(TaskDomainError::EmptyTitle);
        }
        let description = data
            .description
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(ToOwned::to_owned);

        Ok(Self {
            id: data.id,
            title: title.to_owned(),
            description,
            due_date: data.due_date,
            priority: data.priority,
            status: data.status,
            category: data.category,
            assigned_to: data.assigned_to,
        })
    }

    /// Returns the store identifier, if the task has been persisted.
    #[must_use]
    pub const fn id(&self) -> Option<&TaskId> {
        self.id.as_ref()
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the due date, if known.
    #[must_use]
    pub const fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns the board column.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the category.
    #[must_use]
    pub const fn category(&self) -> Category {
        self.category
    }

    /// Returns the assigned contact identifiers.
    #[must_use]
    pub const fn assigned_to(&self) -> &BTreeSet<ContactId> {
        &self.assigned_to
    }

    /// Returns a copy carrying the store identifier.
    #[must_use]
    pub fn with_id(self, id: TaskId) -> Self {
        Self {
            id: Some(id),
            ..self
        }
    }

    /// Moves the task to another column.
    pub const fn set_status(&mut self, status: TaskStatus) {
        self.status = status;
    }

    /// Returns `true` when the title or description contains `needle`.
    ///
    /// `needle` must already be lowercase.
    #[must_use]
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self
                .description
                .as_deref()
                .is_some_and(|text| text.to_lowercase().contains(needle))
    }
}
