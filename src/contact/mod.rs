//! People tasks can be assigned to.
//!
//! Tasks reference contacts by identifier only. The [`services::ContactDirectory`]
//! keeps the live contact list that edit sessions resolve those identifiers
//! against.

pub mod domain;
pub mod services;

#[cfg(test)]
mod tests;
