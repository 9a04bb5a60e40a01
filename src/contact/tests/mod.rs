//! Unit tests for the contact module.

mod domain_tests;
