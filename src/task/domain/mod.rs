//! Domain model for the task board.
//!
//! Tasks, subtasks, due dates and the per-status buckets are pure values; all
//! store access lives outside this module.

mod buckets;
mod due_date;
mod error;
mod ids;
mod status;
mod subtask;
mod subtask_diff;
mod summary;
mod task;

pub use buckets::{BoardBuckets, SortOrder};
pub use due_date::{
    CALENDAR_DATE_FORMAT, DueDateValue, StoreTimestamp, format_calendar_date, parse_date_text,
};
pub use error::{ParseCategoryError, ParsePriorityError, ParseTaskStatusError, TaskDomainError};
pub use ids::{SubtaskId, TaskId};
pub use status::{Category, Priority, TaskStatus};
pub use subtask::Subtask;
pub use subtask_diff::{SubtaskDiff, SubtaskUpsert};
pub use summary::BoardSummary;
pub use task::{Task, TaskData};
