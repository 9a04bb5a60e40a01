//! Board-wide counters shown on the summary page.

use super::{BoardBuckets, Priority, TaskStatus};
use chrono::NaiveDate;
use mockable::Clock;

/// Aggregate counts over the current board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoardSummary {
    to_do: usize,
    in_progress: usize,
    await_feedback: usize,
    done: usize,
    urgent: usize,
    upcoming_urgent_deadline: Option<NaiveDate>,
}

impl BoardSummary {
    /// Summarises the board relative to the clock's current UTC date.
    #[must_use]
    pub fn from_buckets(buckets: &BoardBuckets, clock: &impl Clock) -> Self {
        Self::as_of(buckets, clock.utc().date_naive())
    }

    /// Summarises the board relative to `today`.
    ///
    /// The upcoming deadline is the earliest due date of an urgent task that
    /// falls on or after `today`.
    #[must_use]
    pub fn as_of(buckets: &BoardBuckets, today: NaiveDate) -> Self {
        let urgent_tasks = || {
            buckets
                .iter()
                .filter(|task| task.priority() == Priority::Urgent)
        };

        Self {
            to_do: buckets.bucket(TaskStatus::ToDo).len(),
            in_progress: buckets.bucket(TaskStatus::InProgress).len(),
            await_feedback: buckets.bucket(TaskStatus::AwaitFeedback).len(),
            done: buckets.bucket(TaskStatus::Done).len(),
            urgent: urgent_tasks().count(),
            upcoming_urgent_deadline: urgent_tasks()
                .filter_map(|task| task.due_date())
                .filter(|due| *due >= today)
                .min(),
        }
    }

    /// Returns the number of tasks in `status`.
    #[must_use]
    pub const fn count(&self, status: TaskStatus) -> usize {
        match status {
            TaskStatus::ToDo => self.to_do,
            TaskStatus::InProgress => self.in_progress,
            TaskStatus::AwaitFeedback => self.await_feedback,
            TaskStatus::Done => self.done,
        }
    }

    /// Returns the number of tasks on the board.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.to_do + self.in_progress + self.await_feedback + self.done
    }

    /// Returns the number of urgent tasks.
    #[must_use]
    pub const fn urgent(&self) -> usize {
        self.urgent
    }

    /// Returns the nearest urgent deadline that has not passed.
    #[must_use]
    pub const fn upcoming_urgent_deadline(&self) -> Option<NaiveDate> {
        self.upcoming_urgent_deadline
    }
}
