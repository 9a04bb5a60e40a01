//! Typed entity adapter over the document store.
//!
//! [`EntityStore`] is the only component that knows collection layout and
//! document fields; services speak tasks, subtasks and contacts.

use super::documents::{
    Decoded, FromDocument, contact_fields, keep_decoded, status_fields, subtask_fields,
    task_fields,
};
use super::ports::{
    CollectionPath, CollectionSubscription, DocumentStore, StoreReadResult, StoreWriteResult,
};
use crate::contact::domain::{Contact, ContactDetails, ContactId};
use crate::task::domain::{Subtask, SubtaskId, Task, TaskId, TaskStatus};
use std::marker::PhantomData;
use std::sync::Arc;

/// Live stream of decoded entities.
#[derive(Debug)]
pub struct EntitySubscription<T> {
    collection: CollectionPath,
    inner: CollectionSubscription,
    _entity: PhantomData<fn() -> T>,
}

impl<T: FromDocument> EntitySubscription<T> {
    const fn new(collection: CollectionPath, inner: CollectionSubscription) -> Self {
        Self {
            collection,
            inner,
            _entity: PhantomData,
        }
    }

    /// Returns the collection this subscription follows.
    #[must_use]
    pub const fn collection(&self) -> &CollectionPath {
        &self.collection
    }

    /// Waits for the next snapshot and decodes every document in it.
    ///
    /// Returns `None` once the stream has closed.
    pub async fn next(&mut self) -> Option<StoreReadResult<Vec<Decoded<T>>>> {
        let snapshot = self.inner.next().await?;
        Some(snapshot.map(|documents| documents.iter().map(T::from_document).collect()))
    }
}

/// Entity Store Adapter: typed create/update/delete and live streams for
/// tasks, subtasks and contacts.
#[derive(Debug)]
pub struct EntityStore<D> {
    documents: Arc<D>,
}

impl<D> Clone for EntityStore<D> {
    fn clone(&self) -> Self {
        Self {
            documents: Arc::clone(&self.documents),
        }
    }
}

impl<D: DocumentStore> EntityStore<D> {
    /// Wraps a document store.
    #[must_use]
    pub const fn new(documents: Arc<D>) -> Self {
        Self { documents }
    }

    /// Returns the underlying document store.
    #[must_use]
    pub const fn documents(&self) -> &Arc<D> {
        &self.documents
    }

    /// Subscribes to the task collection.
    ///
    /// # Errors
    ///
    /// Returns the store's read error when the subscription cannot be opened.
    pub fn subscribe_tasks(&self) -> StoreReadResult<EntitySubscription<Task>> {
        self.subscribe(CollectionPath::Tasks)
    }

    /// Subscribes to the subtasks of one task.
    ///
    /// # Errors
    ///
    /// Returns the store's read error when the subscription cannot be opened.
    pub fn subscribe_subtasks(
        &self,
        task_id: &TaskId,
    ) -> StoreReadResult<EntitySubscription<Subtask>> {
        self.subscribe(CollectionPath::Subtasks(task_id.clone()))
    }

    /// Subscribes to the contact collection.
    ///
    /// # Errors
    ///
    /// Returns the store's read error when the subscription cannot be opened.
    pub fn subscribe_contacts(&self) -> StoreReadResult<EntitySubscription<Contact>> {
        self.subscribe(CollectionPath::Contacts)
    }

    fn subscribe<T: FromDocument>(
        &self,
        collection: CollectionPath,
    ) -> StoreReadResult<EntitySubscription<T>> {
        let inner = self.documents.subscribe_collection(&collection)?;
        Ok(EntitySubscription::new(collection, inner))
    }

    /// Reads the current subtasks of a task once, dropping undecodable ones.
    ///
    /// # Errors
    ///
    /// Returns the store's read error when the read fails.
    pub async fn fetch_subtasks(&self, task_id: &TaskId) -> StoreReadResult<Vec<Subtask>> {
        let collection = CollectionPath::Subtasks(task_id.clone());
        let documents = self.documents.fetch_collection(&collection).await?;
        let decoded = documents.iter().map(Subtask::from_document).collect();
        Ok(keep_decoded(decoded, &collection))
    }

    /// Creates a task and returns its store identifier.
    ///
    /// # Errors
    ///
    /// Returns the store's write error.
    pub async fn create_task(&self, task: &Task) -> StoreWriteResult<TaskId> {
        let id = self
            .documents
            .create(&CollectionPath::Tasks, task_fields(task))
            .await?;
        Ok(TaskId::new(id))
    }

    /// Rewrites every field of a stored task.
    ///
    /// # Errors
    ///
    /// Returns the store's write error.
    pub async fn update_task(&self, task_id: &TaskId, task: &Task) -> StoreWriteResult<()> {
        let path = CollectionPath::Tasks.document(task_id.as_str());
        self.documents.update(&path, task_fields(task)).await
    }

    /// Writes only the status field of a stored task.
    ///
    /// # Errors
    ///
    /// Returns the store's write error.
    pub async fn update_task_status(
        &self,
        task_id: &TaskId,
        status: TaskStatus,
    ) -> StoreWriteResult<()> {
        let path = CollectionPath::Tasks.document(task_id.as_str());
        self.documents.update(&path, status_fields(status)).await
    }

    /// Deletes a task document. Its subtasks are not touched.
    ///
    /// # Errors
    ///
    /// Returns the store's write error.
    pub async fn delete_task(&self, task_id: &TaskId) -> StoreWriteResult<()> {
        let path = CollectionPath::Tasks.document(task_id.as_str());
        self.documents.delete(&path).await
    }

    /// Creates a subtask under `task_id` and returns its persisted identifier.
    ///
    /// # Errors
    ///
    /// Returns the store's write error.
    pub async fn create_subtask(
        &self,
        task_id: &TaskId,
        subtask: &Subtask,
    ) -> StoreWriteResult<SubtaskId> {
        let collection = CollectionPath::Subtasks(task_id.clone());
        let id = self
            .documents
            .create(&collection, subtask_fields(subtask))
            .await?;
        Ok(SubtaskId::Persisted(id))
    }

    /// Rewrites a stored subtask.
    ///
    /// # Errors
    ///
    /// Returns the store's write error.
    pub async fn update_subtask(
        &self,
        task_id: &TaskId,
        subtask_id: &str,
        subtask: &Subtask,
    ) -> StoreWriteResult<()> {
        let path = CollectionPath::Subtasks(task_id.clone()).document(subtask_id);
        self.documents.update(&path, subtask_fields(subtask)).await
    }

    /// Deletes a stored subtask.
    ///
    /// # Errors
    ///
    /// Returns the store's write error.
    pub async fn delete_subtask(&self, task_id: &TaskId, subtask_id: &str) -> StoreWriteResult<()> {
        let path = CollectionPath::Subtasks(task_id.clone()).document(subtask_id);
        self.documents.delete(&path).await
    }

    /// Creates a contact.
    ///
    /// # Errors
    ///
    /// Returns the store's write error.
    pub async fn create_contact(&self, details: &ContactDetails) -> StoreWriteResult<Contact> {
        let id = self
            .documents
            .create(&CollectionPath::Contacts, contact_fields(details))
            .await?;
        Ok(Contact::new(ContactId::new(id), details.clone()))
    }

    /// Rewrites a stored contact.
    ///
    /// # Errors
    ///
    /// Returns the store's write error.
    pub async fn update_contact(&self, contact: &Contact) -> StoreWriteResult<()> {
        let path = CollectionPath::Contacts.document(contact.id().as_str());
        self.documents
            .update(&path, contact_fields(contact.details()))
            .await
    }

    /// Deletes a stored contact.
    ///
    /// # Errors
    ///
    /// Returns the store's write error.
    pub async fn delete_contact(&self, contact_id: &ContactId) -> StoreWriteResult<()> {
        let path = CollectionPath::Contacts.document(contact_id.as_str());
        self.documents.delete(&path).await
    }
}
