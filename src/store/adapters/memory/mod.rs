//! In-memory document store used by tests and local tooling.

mod store;

pub use store::{InMemoryDocumentStore, WriteOperation};
