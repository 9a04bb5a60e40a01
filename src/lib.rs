//! Taskboard: real-time task board state synchronisation.
//!
//! This crate keeps a collaborative kanban board consistent with a live
//! document store. It distributes the task collection into status buckets,
//! persists drag-and-drop status changes, and coordinates composite task
//! editing including subtask reconciliation.
//!
//! # Architecture
//!
//! Taskboard follows hexagonal architecture principles:
//!
//! - **Domain**: Pure board logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for the document store
//! - **Adapters**: Concrete implementations of ports (in-memory store)
//!
//! # Modules
//!
//! - [`store`]: Document store port, in-memory adapter and entity codec
//! - [`task`]: Tasks, buckets, distributor, drag-and-drop and editing
//! - [`contact`]: Contacts and the live contact directory
//! - [`config`]: Board configuration
//! - [`telemetry`]: Tracing subscriber installation

pub mod config;
pub mod contact;
pub mod store;
pub mod task;
pub mod telemetry;
