//! Error types for contact validation.

use thiserror::Error;

/// Errors returned while constructing contact values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContactDomainError {
    /// The contact name is empty after trimming.
    #[error("contact name must not be empty")]
    EmptyName,
}
