//! Port for the real-time document-collection backend.

use super::CollectionSubscription;
use crate::task::domain::TaskId;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Field map of a stored document.
pub type Fields = Map<String, Value>;

/// Result type for document reads and subscriptions.
pub type StoreReadResult<T> = Result<T, StoreReadError>;

/// Result type for document writes.
pub type StoreWriteResult<T> = Result<T, StoreWriteError>;

/// Collections the board reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CollectionPath {
    /// Top-level task collection.
    Tasks,
    /// Top-level contact collection.
    Contacts,
    /// Subtasks nested under one task.
    Subtasks(TaskId),
}

impl CollectionPath {
    /// Returns the path of a document inside this collection.
    #[must_use]
    pub fn document(&self, id: impl Into<String>) -> DocumentPath {
        DocumentPath {
            collection: self.clone(),
            id: id.into(),
        }
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tasks => f.write_str("tasks"),
            Self::Contacts => f.write_str("contacts"),
            Self::Subtasks(task_id) => write!(f, "tasks/{task_id}/subtasks"),
        }
    }
}

/// Path of a single document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentPath {
    collection: CollectionPath,
    id: String,
}

impl DocumentPath {
    /// Returns the containing collection.
    #[must_use]
    pub const fn collection(&self) -> &CollectionPath {
        &self.collection
    }

    /// Returns the document identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// A stored document: identifier plus fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    id: String,
    fields: Fields,
}

impl Document {
    /// Creates a document value.
    #[must_use]
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Returns the document identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the document fields.
    #[must_use]
    pub const fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Returns the fields mutably.
    pub const fn fields_mut(&mut self) -> &mut Fields {
        &mut self.fields
    }
}

/// Real-time document-collection contract.
///
/// Subscriptions emit the full current set of documents on every change.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Subscribes to live snapshots of a collection.
    ///
    /// The first snapshot delivered is the collection as it is now.
    ///
    /// # Errors
    ///
    /// Returns [`StoreReadError`] when the subscription cannot be opened.
    fn subscribe_collection(
        &self,
        collection: &CollectionPath,
    ) -> StoreReadResult<CollectionSubscription>;

    /// Reads the current documents of a collection once.
    ///
    /// # Errors
    ///
    /// Returns [`StoreReadError`] when the read fails.
    async fn fetch_collection(&self, collection: &CollectionPath)
    -> StoreReadResult<Vec<Document>>;

    /// Adds a document and returns its store-assigned identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreWriteError`] on transport or permission failure.
    async fn create(&self, collection: &CollectionPath, fields: Fields)
    -> StoreWriteResult<String>;

    /// Merges `fields` into an existing document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreWriteError::NotFound`] when the document does not exist,
    /// or another [`StoreWriteError`] on transport or permission failure.
    async fn update(&self, document: &DocumentPath, fields: Fields) -> StoreWriteResult<()>;

    /// Deletes a document. Deleting a missing document succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`StoreWriteError`] on transport or permission failure.
    async fn delete(&self, document: &DocumentPath) -> StoreWriteResult<()>;
}

/// Errors returned by store writes.
#[derive(Debug, Clone, Error)]
pub enum StoreWriteError {
    /// The backend could not be reached.
    #[error("document store unavailable: {0}")]
    Unavailable(String),

    /// The caller may not write to the path.
    #[error("permission denied for {0}")]
    PermissionDenied(String),

    /// The target document does not exist.
    #[error("document not found: {0}")]
    NotFound(DocumentPath),

    /// Any other backend failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl StoreWriteError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

/// Errors returned by store reads and delivered on subscription streams.
#[derive(Debug, Clone, Error)]
pub enum StoreReadError {
    /// The live subscription failed.
    #[error("subscription to {collection} failed: {reason}")]
    Subscription {
        /// Collection whose stream failed.
        collection: String,
        /// Backend-provided reason.
        reason: String,
    },

    /// Any other backend failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl StoreReadError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
