//! Due date representations and their normalisation to a calendar date.
//!
//! Due dates reach the board in three shapes: a calendar date produced in
//! process, a backend timestamp, or free text from a form or an older
//! document. [`DueDateValue::to_calendar_date`] is the single conversion point.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Calendar format used by forms and by [`format_calendar_date`].
pub const CALENDAR_DATE_FORMAT: &str = "%Y-%m-%d";

/// Backend timestamp expressed as seconds and nanoseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreTimestamp {
    /// Whole seconds since the epoch.
    pub seconds: i64,
    /// Sub-second nanoseconds.
    pub nanoseconds: u32,
}

impl StoreTimestamp {
    /// Returns the timestamp for midnight UTC of `date`.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            seconds: date.and_time(NaiveTime::MIN).and_utc().timestamp(),
            nanoseconds: 0,
        }
    }

    /// Returns the UTC calendar date of the timestamp.
    ///
    /// Returns `None` when the timestamp is outside the representable range.
    #[must_use]
    pub fn to_date(self) -> Option<NaiveDate> {
        DateTime::from_timestamp(self.seconds, self.nanoseconds).map(|instant| instant.date_naive())
    }
}

/// A due date in any representation the board accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DueDateValue {
    /// A calendar date.
    Date(NaiveDate),
    /// A backend timestamp.
    Timestamp(StoreTimestamp),
    /// An ISO-8601 date or date-time string.
    Text(String),
}

impl DueDateValue {
    /// Normalises the value to a calendar date.
    ///
    /// Returns `None` for empty or unparseable text and out-of-range
    /// timestamps.
    #[must_use]
    pub fn to_calendar_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(date) => Some(*date),
            Self::Timestamp(timestamp) => timestamp.to_date(),
            Self::Text(raw) => parse_date_text(raw),
        }
    }
}

impl From<NaiveDate> for DueDateValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<StoreTimestamp> for DueDateValue {
    fn from(value: StoreTimestamp) -> Self {
        Self::Timestamp(value)
    }
}

/// Parses a plain calendar date or an ISO-8601 date-time.
///
/// Date-times with an offset keep the calendar date as written in that
/// offset.
#[must_use]
pub fn parse_date_text(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    NaiveDate::parse_from_str(trimmed, CALENDAR_DATE_FORMAT)
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|instant| instant.date_naive())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|instant| instant.date())
        })
}

/// Formats a calendar date the way date inputs expect it.
#[must_use]
pub fn format_calendar_date(date: NaiveDate) -> String {
    date.format(CALENDAR_DATE_FORMAT).to_string()
}
