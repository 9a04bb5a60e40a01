//! Composite task editing.
//!
//! An [`EditSession`] carries the form's independent sub-states (basic
//! fields, priority and category, assigned contacts, subtasks). The
//! [`TaskEditCoordinator`] loads sessions from tasks and saves them back
//! through the entity store.

mod coordinator;
mod holders;
mod session;

pub use coordinator::TaskEditCoordinator;
pub use holders::{BasicFields, Classification, ContactSelection, SubtaskEditor};
pub use session::{EditSession, EditTarget, ValidationErrors};

use crate::store::ports::{StoreReadError, StoreWriteError};
use crate::task::domain::TaskDomainError;
use thiserror::Error;

/// Errors returned by edit flows.
#[derive(Debug, Error)]
pub enum EditError {
    /// One or more form fields are invalid.
    #[error("task form is incomplete: {0:?}")]
    Validation(ValidationErrors),
    /// The built task violates a domain rule.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// A store write failed.
    #[error(transparent)]
    Write(#[from] StoreWriteError),
    /// A store read failed.
    #[error(transparent)]
    Read(#[from] StoreReadError),
}
