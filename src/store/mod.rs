//! Real-time document store access.
//!
//! The [`ports::DocumentStore`] trait stands for the external real-time
//! collection API. [`EntityStore`] wraps it with typed operations for the
//! board's three entities, and [`documents`] holds the field-level schema.

pub mod adapters;
pub mod documents;
mod entity;
pub mod ports;

pub use entity::{EntityStore, EntitySubscription};

#[cfg(test)]
mod tests;
