//! Contact entity referenced by task assignments.

use super::{ContactDomainError, ContactId};
use serde::{Deserialize, Serialize};

/// Contact details for a person tasks can be assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    id: ContactId,
    details: ContactDetails,
}

/// Editable contact fields, without an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    name: String,
    email: String,
    phone: Option<String>,
}

impl ContactDetails {
    /// Creates validated contact details.
    ///
    /// Name and email are trimmed; a blank phone number is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ContactDomainError::EmptyName`] when the name is empty after
    /// trimming.
    pub fn new(
        name: impl AsRef<str>,
        email: impl AsRef<str>,
        phone: Option<String>,
    ) -> Result<Self, ContactDomainError> {
        let trimmed_name = name.as_ref().trim();
        if trimmed_name.is_empty() {
            return Err(ContactDomainError::EmptyName);
        }
        Ok(Self {
            name: trimmed_name.to_owned(),
            email: email.as_ref().trim().to_owned(),
            phone: phone
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty()),
        })
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the email address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the phone number, if any.
    #[must_use]
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }
}

impl Contact {
    /// Attaches a store identifier to contact details.
    #[must_use]
    pub const fn new(id: ContactId, details: ContactDetails) -> Self {
        Self { id, details }
    }

    /// Returns the contact identifier.
    #[must_use]
    pub const fn id(&self) -> &ContactId {
        &self.id
    }

    /// Returns the editable details.
    #[must_use]
    pub const fn details(&self) -> &ContactDetails {
        &self.details
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.details.name()
    }

    /// Returns the email address.
    #[must_use]
    pub fn email(&self) -> &str {
        self.details.email()
    }

    /// Returns the phone number, if any.
    #[must_use]
    pub fn phone(&self) -> Option<&str> {
        self.details.phone()
    }

    /// Returns uppercase initials of the first and last name.
    ///
    /// Single-word names yield one letter.
    #[must_use]
    pub fn initials(&self) -> String {
        let mut words = self.name().split_whitespace();
        let first = words.next().and_then(|word| word.chars().next());
        let last = words.last().and_then(|word| word.chars().next());
        first
            .into_iter()
            .chain(last)
            .flat_map(char::to_uppercase)
            .collect()
    }
}
