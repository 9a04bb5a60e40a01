//! Thread-safe in-memory document store with live collection streams.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockWriteGuard};
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

use crate::store::ports::{
    CollectionPath, CollectionSnapshot, CollectionSubscription, Document, DocumentPath,
    DocumentStore, Fields, StoreReadError, StoreReadResult, StoreWriteError, StoreWriteResult,
};

const DEFAULT_STREAM_CAPACITY: usize = 64;

/// Write accepted by the in-memory store, in the order it was applied.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOperation {
    /// A document was added.
    Create {
        /// Path of the new document.
        document: DocumentPath,
        /// Fields written.
        fields: Fields,
    },
    /// Fields were merged into a document.
    Update {
        /// Path of the updated document.
        document: DocumentPath,
        /// Fields written.
        fields: Fields,
    },
    /// A document was removed.
    Delete {
        /// Path of the removed document.
        document: DocumentPath,
    },
}

impl WriteOperation {
    /// Returns the path the write targeted.
    #[must_use]
    pub const fn document(&self) -> &DocumentPath {
        match self {
            Self::Create { document, .. }
            | Self::Update { document, .. }
            | Self::Delete { document } => document,
        }
    }
}

/// Thread-safe in-memory document store.
///
/// Collections keep insertion order. Every write publishes a fresh snapshot
/// to subscribers of the affected collection.
#[derive(Debug, Clone)]
pub struct InMemoryDocumentStore {
    state: Arc<RwLock<InMemoryStoreState>>,
    stream_capacity: usize,
}

#[derive(Debug, Default)]
struct InMemoryStoreState {
    collections: HashMap<CollectionPath, Vec<Document>>,
    channels: HashMap<CollectionPath, broadcast::Sender<CollectionSnapshot>>,
    write_log: Vec<WriteOperation>,
    write_failure: Option<WriteFailure>,
}

#[derive(Debug)]
struct WriteFailure {
    remaining_successes: usize,
    error: StoreWriteError,
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDocumentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::with_stream_capacity(DEFAULT_STREAM_CAPACITY)
    }

    /// Creates an empty store whose streams buffer `capacity` snapshots.
    #[must_use]
    pub fn with_stream_capacity(capacity: usize) -> Self {
        Self {
            state: Arc::default(),
            stream_capacity: capacity.max(1),
        }
    }

    /// Inserts a document under a chosen identifier, bypassing the write log.
    ///
    /// Replaces any document with the same identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreWriteError::Persistence`] when the store lock is
    /// poisoned.
    pub fn seed(&self, collection: &CollectionPath, document: Document) -> StoreWriteResult<()> {
        let mut state = self.write_state()?;
        let documents = state.collections.entry(collection.clone()).or_default();
        match documents.iter_mut().find(|stored| stored.id() == document.id()) {
            Some(stored) => *stored = document,
            None => documents.push(document),
        }
        publish(&state, collection);
        Ok(())
    }

    /// Makes every subsequent write fail with `error`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreWriteError::Persistence`] when the store lock is
    /// poisoned.
    pub fn fail_writes(&self, error: StoreWriteError) -> StoreWriteResult<()> {
        self.fail_writes_after(0, error)
    }

    /// Lets `successes` more writes through, then fails every write with
    /// `error`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreWriteError::Persistence`] when the store lock is
    /// poisoned.
    pub fn fail_writes_after(
        &self,
        successes: usize,
        error: StoreWriteError,
    ) -> StoreWriteResult<()> {
        let mut state = self.write_state()?;
        state.write_failure = Some(WriteFailure {
            remaining_successes: successes,
            error,
        });
        Ok(())
    }

    /// Stops injecting write failures.
    ///
    /// # Errors
    ///
    /// Returns [`StoreWriteError::Persistence`] when the store lock is
    /// poisoned.
    pub fn restore_writes(&self) -> StoreWriteResult<()> {
        self.write_state()?.write_failure = None;
        Ok(())
    }

    /// Delivers `error` to every subscriber of `collection`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreReadError::Persistence`] when the store lock is
    /// poisoned.
    pub fn fail_subscription(
        &self,
        collection: &CollectionPath,
        error: StoreReadError,
    ) -> StoreReadResult<()> {
        let state = self.state.read().map_err(|err| {
            StoreReadError::persistence(std::io::Error::other(err.to_string()))
        })?;
        if let Some(sender) = state.channels.get(collection)
            && sender.send(Err(error)).is_err()
        {
            debug!(%collection, "no subscribers to receive the stream failure");
        }
        Ok(())
    }

    /// Returns every accepted write in order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreReadError::Persistence`] when the store lock is
    /// poisoned.
    pub fn write_log(&self) -> StoreReadResult<Vec<WriteOperation>> {
        let state = self.state.read().map_err(|err| {
            StoreReadError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(state.write_log.clone())
    }

    fn write_state(&self) -> StoreWriteResult<RwLockWriteGuard<'_, InMemoryStoreState>> {
        self.state
            .write()
            .map_err(|err| StoreWriteError::persistence(std::io::Error::other(err.to_string())))
    }

    /// Takes the write lock and consumes one write from the failure plan.
    fn begin_write(&self) -> StoreWriteResult<RwLockWriteGuard<'_, InMemoryStoreState>> {
        let mut state = self.write_state()?;
        if let Some(failure) = state.write_failure.as_mut() {
            if failure.remaining_successes == 0 {
                return Err(failure.error.clone());
            }
            failure.remaining_successes -= 1;
        }
        Ok(state)
    }
}

/// Sends the current contents of `collection` to its subscribers.
fn publish(state: &InMemoryStoreState, collection: &CollectionPath) {
    let Some(sender) = state.channels.get(collection) else {
        return;
    };
    let snapshot = state
        .collections
        .get(collection)
        .cloned()
        .unwrap_or_default();
    if sender.send(Ok(snapshot)).is_err() {
        debug!(%collection, "no live subscribers for collection");
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    fn subscribe_collection(
        &self,
        collection: &CollectionPath,
    ) -> StoreReadResult<CollectionSubscription> {
        let mut state = self.state.write().map_err(|err| {
            StoreReadError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let capacity = self.stream_capacity;
        let receiver = state
            .channels
            .entry(collection.clone())
            .or_insert_with(|| broadcast::channel(capacity).0)
            .subscribe();
        let initial = state
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default();
        Ok(CollectionSubscription::new(Ok(initial), receiver))
    }

    async fn fetch_collection(
        &self,
        collection: &CollectionPath,
    ) -> StoreReadResult<Vec<Document>> {
        let state = self.state.read().map_err(|err| {
            StoreReadError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(state
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default())
    }

    async fn create(
        &self,
        collection: &CollectionPath,
        fields: Fields,
    ) -> StoreWriteResult<String> {
        let mut state = self.begin_write()?;
        let id = Uuid::new_v4().simple().to_string();
        state
            .collections
            .entry(collection.clone())
            .or_default()
            .push(Document::new(id.clone(), fields.clone()));
        state.write_log.push(WriteOperation::Create {
            document: collection.document(id.clone()),
            fields,
        });
        publish(&state, collection);
        Ok(id)
    }

    async fn update(&self, document: &DocumentPath, fields: Fields) -> StoreWriteResult<()> {
        let mut state = self.begin_write()?;
        let stored = state
            .collections
            .get_mut(document.collection())
            .and_then(|documents| documents.iter_mut().find(|stored| stored.id() == document.id()))
            .ok_or_else(|| StoreWriteError::NotFound(document.clone()))?;
        for (key, value) in &fields {
            stored.fields_mut().insert(key.clone(), value.clone());
        }
        state.write_log.push(WriteOperation::Update {
            document: document.clone(),
            fields,
        });
        publish(&state, document.collection());
        Ok(())
    }

    async fn delete(&self, document: &DocumentPath) -> StoreWriteResult<()> {
        let mut state = self.begin_write()?;
        if let Some(documents) = state.collections.get_mut(document.collection()) {
            documents.retain(|stored| stored.id() != document.id());
        }
        state.write_log.push(WriteOperation::Delete {
            document: document.clone(),
        });
        publish(&state, document.collection());
        Ok(())
    }
}
