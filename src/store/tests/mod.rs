//! Unit tests for the document store port, its in-memory adapter and the
//! entity codec.
