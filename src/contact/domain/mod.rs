//! Domain model for contacts.

mod contact;
mod error;
mod ids;

pub use contact::{Contact, ContactDetails};
pub use error::ContactDomainError;
pub use ids::ContactId;
