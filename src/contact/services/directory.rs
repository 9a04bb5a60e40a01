//! Live contact directory.

use crate::contact::domain::{Contact, ContactDetails, ContactDomainError, ContactId};
use crate::store::documents::keep_decoded;
use crate::store::ports::{DocumentStore, StoreReadError, StoreWriteError};
use crate::store::{EntityStore, EntitySubscription};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Errors returned by the contact directory.
#[derive(Debug, Error)]
pub enum ContactDirectoryError {
    /// A live contact stream is already attached.
    #[error("contact directory is already subscribed")]
    AlreadySubscribed,
    /// The contact details are invalid.
    #[error(transparent)]
    Domain(#[from] ContactDomainError),
    /// A store write failed.
    #[error(transparent)]
    Write(#[from] StoreWriteError),
    /// The contact stream could not be opened.
    #[error(transparent)]
    Read(#[from] StoreReadError),
}

/// Change notifications emitted by the directory.
#[derive(Debug, Clone)]
pub enum DirectoryEvent {
    /// The cached contact list was replaced.
    ContactsChanged,
    /// The contact stream reported an error and stopped.
    StreamFailed(StoreReadError),
}

#[derive(Debug, Default)]
struct SharedContacts {
    epoch: AtomicU64,
    contacts: RwLock<Arc<Vec<Contact>>>,
}

impl SharedContacts {
    fn snapshot(&self) -> Arc<Vec<Contact>> {
        Arc::clone(&self.contacts.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn replace(&self, epoch: u64, contacts: Vec<Contact>) -> bool {
        let mut slot = self.contacts.write().unwrap_or_else(PoisonError::into_inner);
        if self.epoch.load(Ordering::Acquire) != epoch {
            return false;
        }
        *slot = Arc::new(contacts);
        true
    }

    fn clear(&self) {
        let mut slot = self.contacts.write().unwrap_or_else(PoisonError::into_inner);
        self.epoch.fetch_add(1, Ordering::AcqRel);
        *slot = Arc::default();
    }
}

/// In-memory contact cache fed by the live contacts stream.
pub struct ContactDirectory<D>
where
    D: DocumentStore + 'static,
{
    store: Arc<EntityStore<D>>,
    shared: Arc<SharedContacts>,
    events: broadcast::Sender<DirectoryEvent>,
    stream: Option<JoinHandle<()>>,
}

impl<D> ContactDirectory<D>
where
    D: DocumentStore + 'static,
{
    /// Creates an unsubscribed, empty directory.
    #[must_use]
    pub fn new(store: Arc<EntityStore<D>>, event_capacity: usize) -> Self {
        let (events, _) = broadcast::channel(event_capacity.max(1));
        Self {
            store,
            shared: Arc::default(),
            events,
            stream: None,
        }
    }

    /// Returns a receiver for change notifications.
    #[must_use]
    pub fn events(&self) -> broadcast::Receiver<DirectoryEvent> {
        self.events.subscribe()
    }

    /// Returns `true` while the contact stream is running.
    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.stream
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Attaches to the live contacts stream.
    ///
    /// # Errors
    ///
    /// Returns [`ContactDirectoryError::AlreadySubscribed`] while a stream is
    /// running, or [`ContactDirectoryError::Read`] when the store refuses the
    /// subscription.
    pub fn subscribe(&mut self) -> Result<(), ContactDirectoryError> {
        if self.is_subscribed() {
            return Err(ContactDirectoryError::AlreadySubscribed);
        }
        let subscription = self.store.subscribe_contacts()?;
        let epoch = self.shared.epoch.load(Ordering::Acquire);
        self.stream = Some(tokio::spawn(run_contact_stream(
            subscription,
            Arc::clone(&self.shared),
            self.events.clone(),
            epoch,
        )));
        info!("subscribed to the contact stream");
        Ok(())
    }

    /// Releases the stream and empties the cache.
    pub fn unsubscribe(&mut self) {
        if let Some(handle) = self.stream.take() {
            handle.abort();
            info!("unsubscribed from the contact stream");
        }
        self.shared.clear();
    }

    /// Returns the cached contacts, sorted by name ignoring case.
    #[must_use]
    pub fn contacts(&self) -> Arc<Vec<Contact>> {
        self.shared.snapshot()
    }

    /// Looks up a cached contact.
    #[must_use]
    pub fn find(&self, id: &ContactId) -> Option<Contact> {
        self.contacts()
            .iter()
            .find(|contact| contact.id() == id)
            .cloned()
    }

    /// Resolves identifiers to known contacts in directory order.
    ///
    /// Unknown identifiers are skipped.
    #[must_use]
    pub fn resolve(&self, ids: &BTreeSet<ContactId>) -> Vec<Contact> {
        self.contacts()
            .iter()
            .filter(|contact| ids.contains(contact.id()))
            .cloned()
            .collect()
    }

    /// Returns contacts whose name contains `query`, ignoring case.
    ///
    /// A blank query matches every contact.
    #[must_use]
    pub fn filter(&self, query: &str) -> Vec<Contact> {
        let needle = query.trim().to_lowercase();
        self.contacts()
            .iter()
            .filter(|contact| contact.name().to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    /// Validates and stores a new contact.
    ///
    /// The cache picks it up from the next stream snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ContactDirectoryError::Domain`] for a blank name or the
    /// store's write error.
    pub async fn create_contact(
        &self,
        name: &str,
        email: &str,
        phone: Option<String>,
    ) -> Result<Contact, ContactDirectoryError> {
        let details = ContactDetails::new(name, email, phone)?;
        let contact = self.store.create_contact(&details).await?;
        info!(contact_id = %contact.id(), "created contact");
        Ok(contact)
    }

    /// Rewrites the details of a stored contact.
    ///
    /// # Errors
    ///
    /// Returns the store's write error.
    pub async fn update_contact(
        &self,
        id: ContactId,
        details: ContactDetails,
    ) -> Result<Contact, ContactDirectoryError> {
        let contact = Contact::new(id, details);
        self.store.update_contact(&contact).await?;
        debug!(contact_id = %contact.id(), "updated contact");
        Ok(contact)
    }

    /// Deletes a stored contact.
    ///
    /// Tasks keep their identifier reference; it is dropped when a task is
    /// next loaded into an edit session.
    ///
    /// # Errors
    ///
    /// Returns the store's write error.
    pub async fn delete_contact(&self, id: &ContactId) -> Result<(), ContactDirectoryError> {
        self.store.delete_contact(id).await?;
        info!(contact_id = %id, "deleted contact");
        Ok(())
    }
}

impl<D> Drop for ContactDirectory<D>
where
    D: DocumentStore + 'static,
{
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

async fn run_contact_stream(
    mut subscription: EntitySubscription<Contact>,
    shared: Arc<SharedContacts>,
    events: broadcast::Sender<DirectoryEvent>,
    epoch: u64,
) {
    while let Some(snapshot) = subscription.next().await {
        match snapshot {
            Ok(entries) => {
                let mut contacts = keep_decoded(entries, subscription.collection());
                contacts.sort_by_cached_key(|contact| contact.name().to_lowercase());
                debug!(contacts = contacts.len(), "refreshed contact directory");
                if !shared.replace(epoch, contacts) {
                    return;
                }
                notify(&events, DirectoryEvent::ContactsChanged);
            }
            Err(error) => {
                error!(%error, "contact stream failed");
                notify(&events, DirectoryEvent::StreamFailed(error));
                return;
            }
        }
    }
}

fn notify(events: &broadcast::Sender<DirectoryEvent>, event: DirectoryEvent) {
    if events.send(event).is_err() {
        debug!("no directory listeners");
    }
}
