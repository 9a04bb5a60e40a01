//! Live collection stream handed out by [`super::DocumentStore`].

use super::{Document, StoreReadError};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::warn;

/// One emission of a collection stream: the full document set, or the error
/// that ended the stream.
pub type CollectionSnapshot = Result<Vec<Document>, StoreReadError>;

/// Receiver side of a live collection subscription.
///
/// Dropping the subscription unsubscribes.
#[derive(Debug)]
pub struct CollectionSubscription {
    initial: Option<CollectionSnapshot>,
    receiver: broadcast::Receiver<CollectionSnapshot>,
}

impl CollectionSubscription {
    /// Creates a subscription that yields `initial` before live updates.
    #[must_use]
    pub const fn new(
        initial: CollectionSnapshot,
        receiver: broadcast::Receiver<CollectionSnapshot>,
    ) -> Self {
        Self {
            initial: Some(initial),
            receiver,
        }
    }

    /// Waits for the next snapshot.
    ///
    /// Returns `None` once the store closes the stream. Snapshots skipped
    /// because the receiver lagged are not replayed; every snapshot is
    /// complete, so the next one supersedes them.
    pub async fn next(&mut self) -> Option<CollectionSnapshot> {
        if let Some(initial) = self.initial.take() {
            return Some(initial);
        }
        loop {
            match self.receiver.recv().await {
                Ok(snapshot) => return Some(snapshot),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "collection subscription lagged behind the store");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}
