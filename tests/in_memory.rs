//! In-memory store integration tests.
//!
//! Tests are organized into modules by functionality:
//! - `board_sync_tests`: Live buckets, drag-and-drop and deletion round trips
//! - `task_edit_flow_tests`: Create and edit flows through the edit coordinator
//! - `contact_flow_tests`: Contact directory feeding edit sessions

mod in_memory {
    pub mod helpers;

    mod board_sync_tests;
    mod contact_flow_tests;
    mod task_edit_flow_tests;
}
