//! Shared test helpers for in-memory store integration tests.

use rstest::fixture;
use std::sync::Arc;
use std::time::Duration;
use taskboard::config::BoardConfig;
use taskboard::store::EntityStore;
use taskboard::store::adapters::memory::InMemoryDocumentStore;
use taskboard::task::services::{BoardEvent, TaskListDistributor};
use tokio::sync::broadcast;
use tokio::time::timeout;

/// How long a test waits for a live update.
pub const EVENT_TIMEOUT: Duration = Duration::from_secs(2);

/// Store handles shared by the services under test.
pub struct Board {
    /// Raw document store, for seeding and inspecting writes.
    pub documents: Arc<InMemoryDocumentStore>,
    /// Typed store the services write through.
    pub store: Arc<EntityStore<InMemoryDocumentStore>>,
    /// Configuration the services are built from.
    pub config: BoardConfig,
}

impl Board {
    /// Creates a distributor over this board's store.
    #[must_use]
    pub fn distributor(&self) -> TaskListDistributor<InMemoryDocumentStore> {
        TaskListDistributor::new(Arc::clone(&self.store), &self.config)
    }
}

/// Provides a fresh board over an empty in-memory store.
#[fixture]
pub fn board() -> Board {
    let documents = Arc::new(InMemoryDocumentStore::new());
    Board {
        store: Arc::new(EntityStore::new(Arc::clone(&documents))),
        documents,
        config: BoardConfig::default(),
    }
}

/// Waits for the next board event satisfying `accept`.
///
/// # Errors
///
/// Returns an error if no matching event arrives within [`EVENT_TIMEOUT`] or
/// the event channel closes.
pub async fn wait_for_event(
    events: &mut broadcast::Receiver<BoardEvent>,
    accept: impl Fn(&BoardEvent) -> bool,
) -> eyre::Result<BoardEvent> {
    let deadline = tokio::time::Instant::now() + EVENT_TIMEOUT;
    loop {
        let event = timeout(
            deadline.saturating_duration_since(tokio::time::Instant::now()),
            events.recv(),
        )
        .await??;
        if accept(&event) {
            return Ok(event);
        }
    }
}

/// Waits until the distributor satisfies `ready`, re-checking after every
/// board event.
///
/// # Errors
///
/// Returns an error if the condition does not hold within [`EVENT_TIMEOUT`].
pub async fn wait_for_board(
    distributor: &TaskListDistributor<InMemoryDocumentStore>,
    events: &mut broadcast::Receiver<BoardEvent>,
    ready: impl Fn(&TaskListDistributor<InMemoryDocumentStore>) -> bool,
) -> eyre::Result<()> {
    if ready(distributor) {
        return Ok(());
    }
    wait_for_event(events, |_| ready(distributor)).await?;
    Ok(())
}
