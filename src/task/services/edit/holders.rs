//! Independent sub-states of a task edit session.

use crate::contact::domain::{Contact, ContactId};
use crate::task::domain::{Category, Priority, Subtask, SubtaskId, TaskDomainError};
use std::collections::BTreeSet;

/// Free-text form fields, kept exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasicFields {
    /// Task title.
    pub title: String,
    /// Task description; blank means none.
    pub description: String,
    /// Due date as entered, normally `YYYY-MM-DD`.
    pub due_date: String,
}

/// Priority and category selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    priority: Priority,
    category: Option<Category>,
    default_priority: Priority,
}

impl Default for Classification {
    fn default() -> Self {
        Self::new(Priority::default())
    }
}

impl Classification {
    /// Creates a selection with `default_priority` and no category.
    #[must_use]
    pub const fn new(default_priority: Priority) -> Self {
        Self {
            priority: default_priority,
            category: None,
            default_priority,
        }
    }

    /// Returns the selected priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns the selected category, if any.
    #[must_use]
    pub const fn category(&self) -> Option<Category> {
        self.category
    }

    /// Returns the priority restored by [`Self::reset`].
    #[must_use]
    pub const fn default_priority(&self) -> Priority {
        self.default_priority
    }

    /// Selects a priority.
    pub const fn set_priority(&mut self, priority: Priority) {
        self.priority = priority;
    }

    /// Selects or clears the category.
    pub const fn set_category(&mut self, category: Option<Category>) {
        self.category = category;
    }

    /// Restores the default priority and clears the category.
    pub fn reset(&mut self) {
        *self = Self::new(self.default_priority);
    }
}

/// Contacts assigned in the form, in selection order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactSelection {
    selected: Vec<Contact>,
}

impl ContactSelection {
    /// Returns the selected contacts.
    #[must_use]
    pub fn selected(&self) -> &[Contact] {
        &self.selected
    }

    /// Returns `true` when the contact is selected.
    #[must_use]
    pub fn is_selected(&self, id: &ContactId) -> bool {
        self.selected.iter().any(|contact| contact.id() == id)
    }

    /// Adds a contact; selecting an already selected contact does nothing.
    pub fn select(&mut self, contact: Contact) {
        if !self.is_selected(contact.id()) {
            self.selected.push(contact);
        }
    }

    /// Removes a contact. Returns `true` when it was selected.
    pub fn deselect(&mut self, id: &ContactId) -> bool {
        let before = self.selected.len();
        self.selected.retain(|contact| contact.id() != id);
        self.selected.len() != before
    }

    /// Selects the contact if it is not selected, deselects it otherwise.
    ///
    /// Returns `true` when the contact ends up selected.
    pub fn toggle(&mut self, contact: &Contact) -> bool {
        if self.deselect(contact.id()) {
            return false;
        }
        self.selected.push(contact.clone());
        true
    }

    /// Returns the selected identifiers without duplicates.
    #[must_use]
    pub fn ids(&self) -> BTreeSet<ContactId> {
        self.selected
            .iter()
            .map(|contact| contact.id().clone())
            .collect()
    }

    /// Deselects everything.
    pub fn reset(&mut self) {
        self.selected.clear();
    }
}

/// Subtask list being edited.
///
/// New entries receive pending identifiers `1, 2, 3, …` that are never reused
/// within the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubtaskEditor {
    items: Vec<Subtask>,
    last_pending: u64,
}

impl SubtaskEditor {
    /// Returns the current list.
    #[must_use]
    pub fn items(&self) -> &[Subtask] {
        &self.items
    }

    /// Appends a new uncompleted subtask.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptySubtaskText`] for blank text; no
    /// identifier is consumed.
    pub fn add(&mut self, text: impl AsRef<str>) -> Result<SubtaskId, TaskDomainError> {
        let subtask = Subtask::pending(self.last_pending + 1, text)?;
        self.last_pending += 1;
        let id = subtask.id().clone();
        self.items.push(subtask);
        Ok(id)
    }

    /// Replaces the text of a subtask; blank text removes it.
    ///
    /// Returns `false` when no subtask has the identifier.
    pub fn rename(&mut self, id: &SubtaskId, text: impl AsRef<str>) -> bool {
        let Some(position) = self.position(id) else {
            return false;
        };
        let renamed = self
            .items
            .get_mut(position)
            .is_some_and(|subtask| subtask.rename(text.as_ref()).is_ok());
        if !renamed {
            self.items.remove(position);
        }
        true
    }

    /// Removes a subtask.
    pub fn remove(&mut self, id: &SubtaskId) -> Option<Subtask> {
        self.position(id).map(|position| self.items.remove(position))
    }

    /// Flips the completion flag. Returns `false` when no subtask matches.
    pub fn toggle(&mut self, id: &SubtaskId) -> bool {
        self.items
            .iter_mut()
            .find(|subtask| subtask.id() == id)
            .map(Subtask::toggle)
            .is_some()
    }

    /// Replaces the list with subtasks read from the store.
    pub fn load(&mut self, subtasks: Vec<Subtask>) {
        self.items = subtasks;
    }

    /// Empties the list and restarts pending numbering.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Gives a pending entry the identifier the store assigned to it.
    pub(super) fn mark_persisted(&mut self, pending: &SubtaskId, id: SubtaskId) {
        if let Some(subtask) = self.items.iter_mut().find(|subtask| subtask.id() == pending) {
            *subtask = subtask.clone().with_id(id);
        }
    }

    fn position(&self, id: &SubtaskId) -> Option<usize> {
        self.items.iter().position(|subtask| subtask.id() == id)
    }
}
