//! Per-status task buckets and their ordering.

use super::{Task, TaskId, TaskStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Ordering applied inside each bucket.
///
/// Tasks without a usable due date always sort after dated tasks, whichever
/// direction is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    /// Earliest due date first.
    #[default]
    DueDateAscending,
    /// Latest due date first.
    DueDateDescending,
}

impl SortOrder {
    /// Compares two optional due dates under this ordering.
    #[must_use]
    pub fn compare(self, left: Option<NaiveDate>, right: Option<NaiveDate>) -> Ordering {
        match (left, right) {
            (Some(left), Some(right)) => match self {
                Self::DueDateAscending => left.cmp(&right),
                Self::DueDateDescending => right.cmp(&left),
            },
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

/// Tasks grouped by status column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardBuckets {
    to_do: Vec<Task>,
    in_progress: Vec<Task>,
    await_feedback: Vec<Task>,
    done: Vec<Task>,
}

impl BoardBuckets {
    /// Groups tasks by status and sorts every bucket.
    ///
    /// The sort is stable, so tasks with equal due dates keep their input
    /// order.
    #[must_use]
    pub fn from_tasks(tasks: impl IntoIterator<Item = Task>, order: SortOrder) -> Self {
        let mut buckets = Self::default();
        for task in tasks {
            buckets.bucket_mut(task.status()).push(task);
        }
        for status in TaskStatus::ALL {
            buckets
                .bucket_mut(status)
                .sort_by(|left, right| order.compare(left.due_date(), right.due_date()));
        }
        buckets
    }

    /// Returns the bucket for `status`.
    #[must_use]
    pub fn bucket(&self, status: TaskStatus) -> &[Task] {
        match status {
            TaskStatus::ToDo => &self.to_do,
            TaskStatus::InProgress => &self.in_progress,
            TaskStatus::AwaitFeedback => &self.await_feedback,
            TaskStatus::Done => &self.done,
        }
    }

    /// Returns the bucket for `status` mutably.
    pub const fn bucket_mut(&mut self, status: TaskStatus) -> &mut Vec<Task> {
        match status {
            TaskStatus::ToDo => &mut self.to_do,
            TaskStatus::InProgress => &mut self.in_progress,
            TaskStatus::AwaitFeedback => &mut self.await_feedback,
            TaskStatus::Done => &mut self.done,
        }
    }

    /// Iterates over all tasks in column order.
    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        TaskStatus::ALL
            .into_iter()
            .flat_map(move |status| self.bucket(status).iter())
    }

    /// Returns the number of tasks across all buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        TaskStatus::ALL
            .into_iter()
            .map(|status| self.bucket(status).len())
            .sum()
    }

    /// Returns `true` when every bucket is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Finds a task by identifier.
    #[must_use]
    pub fn find(&self, id: &TaskId) -> Option<&Task> {
        self.iter().find(|task| task.id() == Some(id))
    }

    /// Returns the buckets restricted to tasks whose title or description
    /// contains `query`, ignoring case.
    ///
    /// A blank query keeps every task.
    #[must_use]
    pub fn filtered(&self, query: &str) -> Self {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.clone();
        }
        let keep = |tasks: &[Task]| -> Vec<Task> {
            tasks
                .iter()
                .filter(|task| task.matches_lowercase(&needle))
                .cloned()
                .collect()
        };
        Self {
            to_do: keep(&self.to_do),
            in_progress: keep(&self.in_progress),
            await_feedback: keep(&self.await_feedback),
            done: keep(&self.done),
        }
    }
}
