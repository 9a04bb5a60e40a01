//! Unit tests for the task module.
//!
//! Domain tests cover pure values; service tests drive the in-memory document
//! store, or a mocked one where a failure has to be injected.

mod distributor_tests;
mod due_date_tests;
