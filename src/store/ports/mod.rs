//! Port contracts for the document store.

pub mod document_store;
pub mod subscription;

pub use document_store::{
    CollectionPath, Document, DocumentPath, DocumentStore, Fields, StoreReadError,
    StoreReadResult, StoreWriteError, StoreWriteResult,
};
pub use subscription::{CollectionSnapshot, CollectionSubscription};
