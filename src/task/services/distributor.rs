//! Live distribution of the task collection into status buckets.
//!
//! Every task snapshot replaces all four buckets at once. Subtasks of each
//! visible task are followed on their own streams and cached by task
//! identifier; the two streams are not transactionally consistent, so a
//! subtask count may briefly lag behind its task.

use crate::config::BoardConfig;
use crate::store::documents::keep_decoded;
use crate::store::ports::{DocumentStore, StoreReadError};
use crate::store::{EntityStore, EntitySubscription};
use crate::task::domain::{
    BoardBuckets, BoardSummary, SortOrder, Subtask, Task, TaskId, TaskStatus,
};
use mockable::Clock;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Change notifications emitted by the distributor.
#[derive(Debug, Clone)]
pub enum BoardEvent {
    /// The buckets were replaced from a new task snapshot.
    TasksChanged,
    /// The cached subtasks of a task were replaced.
    SubtasksChanged(TaskId),
    /// A task or subtask stream reported an error and stopped.
    StreamFailed(StoreReadError),
}

/// Errors returned by [`TaskListDistributor::subscribe`].
#[derive(Debug, Error)]
pub enum DistributorError {
    /// A live task stream is already attached.
    #[error("task list distributor is already subscribed")]
    AlreadySubscribed,
    /// The task stream could not be opened.
    #[error(transparent)]
    Read(#[from] StoreReadError),
}

/// Completed and total subtask counts of one task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubtaskProgress {
    /// Subtasks marked completed.
    pub completed: usize,
    /// All subtasks.
    pub total: usize,
}

/// Task List Distributor.
pub struct TaskListDistributor<D>
where
    D: DocumentStore + 'static,
{
    store: Arc<EntityStore<D>>,
    sort_order: SortOrder,
    shared: Arc<SharedBoard>,
    events: broadcast::Sender<BoardEvent>,
    task_stream: Option<JoinHandle<()>>,
}

/// State written by the stream tasks and read by the distributor's getters.
#[derive(Debug, Default)]
struct SharedBoard {
    epoch: AtomicU64,
    buckets: RwLock<Arc<BoardBuckets>>,
    subtasks: RwLock<HashMap<TaskId, Vec<Subtask>>>,
    subtask_streams: Mutex<HashMap<TaskId, JoinHandle<()>>>,
}

impl SharedBoard {
    fn buckets(&self) -> Arc<BoardBuckets> {
        Arc::clone(&self.buckets.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Installs new buckets unless the board was cleared since `epoch`.
    fn replace_buckets(&self, epoch: u64, buckets: BoardBuckets) -> bool {
        let mut slot = self.buckets.write().unwrap_or_else(PoisonError::into_inner);
        if self.epoch.load(Ordering::Acquire) != epoch {
            return false;
        }
        *slot = Arc::new(buckets);
        true
    }

    fn subtasks(&self, task_id: &TaskId) -> Vec<Subtask> {
        self.subtasks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(task_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Caches subtasks while the task still has a registered stream.
    fn store_subtasks(&self, task_id: &TaskId, subtasks: Vec<Subtask>) -> bool {
        let streams = self
            .subtask_streams
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !streams.contains_key(task_id) {
            return false;
        }
        self.subtasks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(task_id.clone(), subtasks);
        true
    }

    /// Stops every subtask stream and empties buckets and cache.
    fn clear(&self) {
        let mut slot = self.buckets.write().unwrap_or_else(PoisonError::into_inner);
        self.epoch.fetch_add(1, Ordering::AcqRel);
        *slot = Arc::default();
        drop(slot);

        let mut streams = self
            .subtask_streams
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        for (_, handle) in streams.drain() {
            handle.abort();
        }
        self.subtasks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl<D> TaskListDistributor<D>
where
    D: DocumentStore + 'static,
{
    /// Creates an unsubscribed distributor with empty buckets.
    #[must_use]
    pub fn new(store: Arc<EntityStore<D>>, config: &BoardConfig) -> Self {
        let (events, _) = broadcast::channel(config.channel_capacity());
        Self {
            store,
            sort_order: config.sort_order,
            shared: Arc::default(),
            events,
            task_stream: None,
        }
    }

    /// Returns a receiver for change notifications.
    #[must_use]
    pub fn events(&self) -> broadcast::Receiver<BoardEvent> {
        self.events.subscribe()
    }

    /// Returns `true` while a task stream is attached and running.
    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.task_stream
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Attaches to the live task stream.
    ///
    /// Must be called from within a Tokio runtime. A stream that ended with
    /// an error is not retried automatically; calling `subscribe` again opens
    /// a fresh one.
    ///
    /// # Errors
    ///
    /// Returns [`DistributorError::AlreadySubscribed`] while a stream is
    /// running, or [`DistributorError::Read`] when the store refuses the
    /// subscription.
    pub fn subscribe(&mut self) -> Result<(), DistributorError> {
        if self.is_subscribed() {
            return Err(DistributorError::AlreadySubscribed);
        }
        let subscription = self.store.subscribe_tasks()?;
        let stream = TaskStream {
            store: Arc::clone(&self.store),
            shared: Arc::clone(&self.shared),
            events: self.events.clone(),
            sort_order: self.sort_order,
            epoch: self.shared.epoch.load(Ordering::Acquire),
        };
        self.task_stream = Some(tokio::spawn(stream.run(subscription)));
        info!("subscribed to the task stream");
        Ok(())
    }

    /// Releases the task stream and every subtask stream, then empties the
    /// buckets and the subtask cache.
    ///
    /// Calling it while unsubscribed only clears.
    pub fn unsubscribe(&mut self) {
        if let Some(handle) = self.task_stream.take() {
            handle.abort();
            info!("unsubscribed from the task stream");
        }
        self.shared.clear();
    }

    /// Returns the current buckets.
    #[must_use]
    pub fn buckets(&self) -> Arc<BoardBuckets> {
        self.shared.buckets()
    }

    /// Returns the tasks in one status bucket.
    #[must_use]
    pub fn bucket(&self, status: TaskStatus) -> Vec<Task> {
        self.buckets().bucket(status).to_vec()
    }

    /// Returns the "to-do" bucket.
    #[must_use]
    pub fn to_do(&self) -> Vec<Task> {
        self.bucket(TaskStatus::ToDo)
    }

    /// Returns the "in-progress" bucket.
    #[must_use]
    pub fn in_progress(&self) -> Vec<Task> {
        self.bucket(TaskStatus::InProgress)
    }

    /// Returns the "await-feedback" bucket.
    #[must_use]
    pub fn await_feedback(&self) -> Vec<Task> {
        self.bucket(TaskStatus::AwaitFeedback)
    }

    /// Returns the "done" bucket.
    #[must_use]
    pub fn done(&self) -> Vec<Task> {
        self.bucket(TaskStatus::Done)
    }

    /// Returns the cached subtasks of a task; empty when none are known.
    #[must_use]
    pub fn subtasks(&self, task_id: &TaskId) -> Vec<Subtask> {
        self.shared.subtasks(task_id)
    }

    /// Returns completed and total subtask counts from the cache.
    #[must_use]
    pub fn subtask_progress(&self, task_id: &TaskId) -> SubtaskProgress {
        let subtasks = self.subtasks(task_id);
        SubtaskProgress {
            completed: subtasks.iter().filter(|subtask| subtask.is_completed()).count(),
            total: subtasks.len(),
        }
    }

    /// Returns the buckets filtered by a title or description query.
    #[must_use]
    pub fn search(&self, query: &str) -> BoardBuckets {
        self.buckets().filtered(query)
    }

    /// Summarises the current buckets.
    #[must_use]
    pub fn summary(&self, clock: &impl Clock) -> BoardSummary {
        BoardSummary::from_buckets(&self.buckets(), clock)
    }
}

impl<D> Drop for TaskListDistributor<D>
where
    D: DocumentStore + 'static,
{
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

/// Everything the spawned task stream needs.
struct TaskStream<D> {
    store: Arc<EntityStore<D>>,
    shared: Arc<SharedBoard>,
    events: broadcast::Sender<BoardEvent>,
    sort_order: SortOrder,
    epoch: u64,
}

impl<D> TaskStream<D>
where
    D: DocumentStore + 'static,
{
    async fn run(self, mut subscription: EntitySubscription<Task>) {
        while let Some(snapshot) = subscription.next().await {
            match snapshot {
                Ok(entries) => {
                    let tasks = keep_decoded(entries, subscription.collection());
                    let buckets = BoardBuckets::from_tasks(tasks, self.sort_order);
                    let visible: HashSet<TaskId> =
                        buckets.iter().filter_map(|task| task.id().cloned()).collect();
                    debug!(tasks = buckets.len(), "distributing task snapshot");
                    if !self.shared.replace_buckets(self.epoch, buckets) {
                        return;
                    }
                    if !self.reconcile_subtask_streams(&visible) {
                        return;
                    }
                    notify(&self.events, BoardEvent::TasksChanged);
                }
                Err(error) => {
                    error!(%error, "task stream failed; live updates stopped");
                    notify(&self.events, BoardEvent::StreamFailed(error));
                    return;
                }
            }
        }
        debug!("task stream closed by the store");
    }

    /// Starts subtask streams for newly visible tasks and stops those of
    /// tasks that left the board.
    ///
    /// Returns `false` without touching the streams when the board was
    /// cleared since this stream started; `clear` bumps the epoch before it
    /// drains the stream map.
    fn reconcile_subtask_streams(&self, visible: &HashSet<TaskId>) -> bool {
        let mut streams = self
            .shared
            .subtask_streams
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if self.shared.epoch.load(Ordering::Acquire) != self.epoch {
            return false;
        }

        let stale: Vec<TaskId> = streams
            .keys()
            .filter(|task_id| !visible.contains(*task_id))
            .cloned()
            .collect();
        if !stale.is_empty() {
            let mut cache = self
                .shared
                .subtasks
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            for task_id in &stale {
                if let Some(handle) = streams.remove(task_id) {
                    handle.abort();
                }
                cache.remove(task_id);
            }
        }

        for task_id in visible {
            if streams.contains_key(task_id) {
                continue;
            }
            match self.store.subscribe_subtasks(task_id) {
                Ok(subscription) => {
                    let handle = tokio::spawn(run_subtask_stream(
                        task_id.clone(),
                        subscription,
                        Arc::clone(&self.shared),
                        self.events.clone(),
                    ));
                    streams.insert(task_id.clone(), handle);
                }
                Err(error) => {
                    warn!(%task_id, %error, "could not subscribe to subtasks");
                }
            }
        }
        true
    }
}

async fn run_subtask_stream(
    task_id: TaskId,
    mut subscription: EntitySubscription<Subtask>,
    shared: Arc<SharedBoard>,
    events: broadcast::Sender<BoardEvent>,
) {
    while let Some(snapshot) = subscription.next().await {
        match snapshot {
            Ok(entries) => {
                let subtasks = keep_decoded(entries, subscription.collection());
                if !shared.store_subtasks(&task_id, subtasks) {
                    return;
                }
                notify(&events, BoardEvent::SubtasksChanged(task_id.clone()));
            }
            Err(error) => {
                warn!(%task_id, %error, "subtask stream failed");
                notify(&events, BoardEvent::StreamFailed(error));
                return;
            }
        }
    }
}

fn notify(events: &broadcast::Sender<BoardEvent>, event: BoardEvent) {
    if events.send(event).is_err() {
        debug!("no board listeners");
    }
}
