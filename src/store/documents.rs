//! Field-level schema of task, subtask and contact documents.
//!
//! Decoding normalises duck-typed values (due dates in particular) into
//! domain types; records that cannot be represented are reported as
//! [`DocumentDecodeError`] and left for the caller to drop.

use crate::contact::domain::{Contact, ContactDetails, ContactId};
use crate::store::ports::{CollectionPath, Document, Fields};
use crate::task::domain::{
    Category, DueDateValue, Priority, StoreTimestamp, Subtask, SubtaskId, Task, TaskData, TaskId,
    TaskStatus,
};
use serde_json::{Value, json};
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::warn;

/// Result of decoding one document.
pub type Decoded<T> = Result<T, DocumentDecodeError>;

/// Errors raised while decoding a stored document into a domain value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DocumentDecodeError {
    /// A required field is absent or not a string.
    #[error("document {id} is missing field `{field}`")]
    MissingField {
        /// Document identifier.
        id: String,
        /// Field name.
        field: &'static str,
    },

    /// The task status is not one of the board columns.
    #[error("document {id} has unknown status `{status}`")]
    UnknownStatus {
        /// Document identifier.
        id: String,
        /// Stored status value.
        status: String,
    },

    /// A field holds a value the domain rejects.
    #[error("document {id} has invalid `{field}`: {reason}")]
    InvalidField {
        /// Document identifier.
        id: String,
        /// Field name.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Domain values that can be read from a stored document.
pub trait FromDocument: Sized {
    /// Decodes a document.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentDecodeError`] when the document does not describe a
    /// valid value.
    fn from_document(document: &Document) -> Decoded<Self>;
}

impl FromDocument for Task {
    fn from_document(document: &Document) -> Decoded<Self> {
        let id = document.id();
        let raw_status = required_str(document, "status")?;
        let status =
            TaskStatus::try_from(raw_status).map_err(|err| DocumentDecodeError::UnknownStatus {
                id: id.to_owned(),
                status: err.0,
            })?;
        let priority = optional_str(document, "priority")
            .map(Priority::try_from)
            .transpose()
            .map_err(|err| invalid(id, "priority", &err))?
            .unwrap_or_default();
        let category = optional_str(document, "category")
            .map(Category::try_from)
            .transpose()
            .map_err(|err| invalid(id, "category", &err))?
            .unwrap_or_default();
        let due_date = document
            .fields()
            .get("dueDate")
            .and_then(due_date_value)
            .and_then(|value| value.to_calendar_date());
        let assigned_to = match document.fields().get("assignedTo") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(ContactId::new)
                .collect(),
            _ => BTreeSet::new(),
        };

        Task::new(TaskData {
            id: Some(TaskId::new(id)),
            title: required_str(document, "title")?.to_owned(),
            description: optional_str(document, "description").map(ToOwned::to_owned),
            due_date,
            priority,
            status,
            category,
            assigned_to,
        })
        .map_err(|err| invalid(id, "title", &err))
    }
}

impl FromDocument for Subtask {
    fn from_document(document: &Document) -> Decoded<Self> {
        let completed = document
            .fields()
            .get("completed")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        Self::new(
            SubtaskId::persisted(document.id()),
            required_str(document, "text")?,
            completed,
        )
        .map_err(|err| invalid(document.id(), "text", &err))
    }
}

impl FromDocument for Contact {
    fn from_document(document: &Document) -> Decoded<Self> {
        let details = ContactDetails::new(
            required_str(document, "name")?,
            optional_str(document, "email").unwrap_or_default(),
            optional_str(document, "phone").map(ToOwned::to_owned),
        )
        .map_err(|err| invalid(document.id(), "name", &err))?;
        Ok(Self::new(ContactId::new(document.id()), details))
    }
}

/// Interprets a stored due date.
///
/// Strings are read as ISO-8601 text and objects with `seconds` and
/// `nanoseconds` as backend timestamps. Anything else has no due date.
#[must_use]
pub fn due_date_value(value: &Value) -> Option<DueDateValue> {
    match value {
        Value::String(text) => Some(DueDateValue::Text(text.clone())),
        Value::Object(map) => {
            let seconds = map.get("seconds").and_then(Value::as_i64)?;
            let nanoseconds = map
                .get("nanoseconds")
                .and_then(Value::as_u64)
                .map_or(Ok(0), u32::try_from)
                .ok()?;
            Some(DueDateValue::Timestamp(StoreTimestamp {
                seconds,
                nanoseconds,
            }))
        }
        _ => None,
    }
}

/// Encodes every persisted task field.
#[must_use]
pub fn task_fields(task: &Task) -> Fields {
    let due_date = task.due_date().map_or(Value::Null, |date| {
        let timestamp = StoreTimestamp::from_date(date);
        json!({ "seconds": timestamp.seconds, "nanoseconds": timestamp.nanoseconds })
    });
    let assigned_to: Vec<Value> = task
        .assigned_to()
        .iter()
        .map(|id| Value::from(id.as_str()))
        .collect();

    let mut fields = Fields::new();
    fields.insert("title".to_owned(), Value::from(task.title()));
    fields.insert(
        "description".to_owned(),
        task.description().map_or(Value::Null, Value::from),
    );
    fields.insert("dueDate".to_owned(), due_date);
    fields.insert("priority".to_owned(), Value::from(task.priority().as_str()));
    fields.insert("status".to_owned(), Value::from(task.status().as_str()));
    fields.insert("category".to_owned(), Value::from(task.category().as_str()));
    fields.insert("assignedTo".to_owned(), Value::Array(assigned_to));
    fields
}

/// Encodes a status-only partial update.
#[must_use]
pub fn status_fields(status: TaskStatus) -> Fields {
    let mut fields = Fields::new();
    fields.insert("status".to_owned(), Value::from(status.as_str()));
    fields
}

/// Encodes subtask text and completion.
#[must_use]
pub fn subtask_fields(subtask: &Subtask) -> Fields {
    let mut fields = Fields::new();
    fields.insert("text".to_owned(), Value::from(subtask.text()));
    fields.insert("completed".to_owned(), Value::from(subtask.is_completed()));
    fields
}

/// Encodes contact details.
#[must_use]
pub fn contact_fields(details: &ContactDetails) -> Fields {
    let mut fields = Fields::new();
    fields.insert("name".to_owned(), Value::from(details.name()));
    fields.insert("email".to_owned(), Value::from(details.email()));
    fields.insert(
        "phone".to_owned(),
        details.phone().map_or(Value::Null, Value::from),
    );
    fields
}

/// Keeps successfully decoded values and logs a warning for each rejected
/// document.
#[must_use]
pub fn keep_decoded<T>(entries: Vec<Decoded<T>>, collection: &CollectionPath) -> Vec<T> {
    entries
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(value) => Some(value),
            Err(error) => {
                warn!(%collection, %error, "dropping undecodable document");
                None
            }
        })
        .collect()
}

fn required_str<'a>(document: &'a Document, field: &'static str) -> Decoded<&'a str> {
    optional_str(document, field).ok_or_else(|| DocumentDecodeError::MissingField {
        id: document.id().to_owned(),
        field,
    })
}

fn optional_str<'a>(document: &'a Document, field: &str) -> Option<&'a str> {
    document.fields().get(field).and_then(Value::as_str)
}

fn invalid(id: &str, field: &'static str, reason: &impl std::fmt::Display) -> DocumentDecodeError {
    DocumentDecodeError::InvalidField {
        id: id.to_owned(),
        field,
        reason: reason.to_string(),
    }
}
