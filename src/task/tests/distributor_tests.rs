//! Tests for the live task list distributor.

use super::fixtures::{
    MockDocuments, date, documents, entity_store, fields, persisted_subtask, seed_subtask,
    seed_task, stored_task, task_with,
};
use crate::config::BoardConfig;
use crate::store::EntityStore;
use crate::store::adapters::memory::InMemoryDocumentStore;
use crate::store::ports::{CollectionPath, Document, StoreReadError};
use crate::task::domain::{SortOrder, TaskId, TaskStatus};
use crate::task::services::{
    BoardEvent, DistributorError, SubtaskProgress, TaskListDistributor,
};
use eyre::{bail, ensure};
use rstest::rstest;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{sleep, timeout};

type TestDistributor = TaskListDistributor<InMemoryDocumentStore>;

const EVENT_TIMEOUT: Duration = Duration::from_secs(2);

fn distributor(documents: &Arc<InMemoryDocumentStore>, config: &BoardConfig) -> TestDistributor {
    TaskListDistributor::new(entity_store(documents), config)
}

/// Waits until an event satisfying `accept` arrives.
async fn wait_for(
    events: &mut broadcast::Receiver<BoardEvent>,
    accept: impl Fn(&BoardEvent) -> bool,
) -> eyre::Result<BoardEvent> {
    let event = timeout(EVENT_TIMEOUT, async {
        loop {
            let event = events.recv().await?;
            if accept(&event) {
                return Ok::<_, broadcast::error::RecvError>(event);
            }
        }
    })
    .await??;
    Ok(event)
}

fn tasks_changed(event: &BoardEvent) -> bool {
    matches!(event, BoardEvent::TasksChanged)
}

fn seed_raw_task(documents: &InMemoryDocumentStore, id: &str, status: &str) {
    documents
        .seed(
            &CollectionPath::Tasks,
            Document::new(
                id,
                fields(json!({
                    "title": format!("Task {id}"),
                    "status": status,
                    "category": "technical",
                })),
            ),
        )
        .expect("seed task");
}

#[rstest]
#[tokio::test]
async fn unknown_status_is_dropped_without_error(
    documents: Arc<InMemoryDocumentStore>,
) -> eyre::Result<()> {
    seed_raw_task(&documents, "t1", "archived");
    let mut distributor = distributor(&documents, &BoardConfig::default());
    let mut events = distributor.events();

    distributor.subscribe()?;
    wait_for(&mut events, tasks_changed).await?;

    ensure!(distributor.buckets().is_empty(), "archived task must not be bucketed");
    for status in TaskStatus::ALL {
        ensure!(distributor.bucket(status).is_empty(), "{status} bucket should be empty");
    }
    ensure!(distributor.is_subscribed(), "stream should keep running");
    Ok(())
}

#[rstest]
#[tokio::test]
async fn snapshot_fills_every_bucket(documents: Arc<InMemoryDocumentStore>) -> eyre::Result<()> {
    seed_task(&documents, &stored_task("t1", TaskStatus::ToDo));
    seed_task(&documents, &stored_task("t2", TaskStatus::InProgress));
    seed_task(&documents, &stored_task("t3", TaskStatus::AwaitFeedback));
    seed_task(&documents, &stored_task("t4", TaskStatus::Done));
    seed_raw_task(&documents, "t5", "archived");
    let mut distributor = distributor(&documents, &BoardConfig::default());
    let mut events = distributor.events();

    distributor.subscribe()?;
    wait_for(&mut events, tasks_changed).await?;

    ensure!(distributor.to_do().len() == 1, "to-do");
    ensure!(distributor.in_progress().len() == 1, "in-progress");
    ensure!(distributor.await_feedback().len() == 1, "await-feedback");
    ensure!(distributor.done().len() == 1, "done");
    Ok(())
}

#[rstest]
#[tokio::test]
async fn new_snapshots_replace_the_buckets(
    documents: Arc<InMemoryDocumentStore>,
) -> eyre::Result<()> {
    seed_task(&documents, &stored_task("t1", TaskStatus::ToDo));
    let mut distributor = distributor(&documents, &BoardConfig::default());
    let mut events = distributor.events();
    distributor.subscribe()?;
    wait_for(&mut events, tasks_changed).await?;

    seed_task(&documents, &stored_task("t1", TaskStatus::Done));
    wait_for(&mut events, tasks_changed).await?;

    ensure!(distributor.to_do().is_empty(), "task left the to-do bucket");
    ensure!(distributor.done().len() == 1, "task entered the done bucket");
    ensure!(distributor.buckets().len() == 1, "task is in exactly one bucket");
    Ok(())
}

#[rstest]
#[tokio::test]
async fn configured_order_is_applied(documents: Arc<InMemoryDocumentStore>) -> eyre::Result<()> {
    seed_task(&documents, &task_with(Some("a"), "Undated", TaskStatus::ToDo, None));
    seed_task(&documents, &task_with(Some("b"), "Early", TaskStatus::ToDo, Some(date(2026, 1, 1))));
    seed_task(&documents, &task_with(Some("c"), "Late", TaskStatus::ToDo, Some(date(2026, 2, 1))));
    let config = BoardConfig {
        sort_order: SortOrder::DueDateDescending,
        ..BoardConfig::default()
    };
    let mut distributor = distributor(&documents, &config);
    let mut events = distributor.events();

    distributor.subscribe()?;
    wait_for(&mut events, tasks_changed).await?;

    let titles: Vec<String> = distributor
        .to_do()
        .iter()
        .map(|task| task.title().to_owned())
        .collect();
    ensure!(titles == ["Late", "Early", "Undated"], "unexpected order {titles:?}");
    Ok(())
}

#[rstest]
#[tokio::test]
async fn subtasks_are_cached_per_visible_task(
    documents: Arc<InMemoryDocumentStore>,
) -> eyre::Result<()> {
    seed_task(&documents, &stored_task("t1", TaskStatus::ToDo));
    seed_subtask(&documents, "t1", &persisted_subtask("a", "x", true));
    seed_subtask(&documents, "t1", &persisted_subtask("b", "y", false));
    let mut distributor = distributor(&documents, &BoardConfig::default());
    let mut events = distributor.events();
    let task_id = TaskId::new("t1");

    distributor.subscribe()?;
    wait_for(&mut events, |event| {
        matches!(event, BoardEvent::SubtasksChanged(id) if id.as_str() == "t1")
    })
    .await?;

    ensure!(distributor.subtasks(&task_id).len() == 2, "both subtasks cached");
    ensure!(
        distributor.subtask_progress(&task_id) == SubtaskProgress { completed: 1, total: 2 },
        "progress counts completed subtasks"
    );
    ensure!(
        distributor.subtasks(&TaskId::new("unknown")).is_empty(),
        "unknown tasks have no subtasks"
    );
    Ok(())
}

#[rstest]
#[tokio::test]
async fn unsubscribe_clears_buckets_and_cache(
    documents: Arc<InMemoryDocumentStore>,
) -> eyre::Result<()> {
    seed_task(&documents, &stored_task("t1", TaskStatus::ToDo));
    seed_subtask(&documents, "t1", &persisted_subtask("a", "x", false));
    let mut distributor = distributor(&documents, &BoardConfig::default());
    let mut events = distributor.events();
    distributor.subscribe()?;
    wait_for(&mut events, |event| matches!(event, BoardEvent::SubtasksChanged(_))).await?;

    distributor.unsubscribe();

    ensure!(!distributor.is_subscribed(), "stream released");
    ensure!(distributor.buckets().is_empty(), "buckets cleared");
    ensure!(distributor.subtasks(&TaskId::new("t1")).is_empty(), "cache cleared");

    distributor.unsubscribe();
    distributor.subscribe()?;
    wait_for(&mut events, |event| {
        tasks_changed(event) && distributor.to_do().len() == 1
    })
    .await?;
    ensure!(distributor.is_subscribed(), "resubscribe reloads the board");
    Ok(())
}

#[rstest]
#[tokio::test]
async fn second_subscribe_is_rejected(documents: Arc<InMemoryDocumentStore>) -> eyre::Result<()> {
    let mut distributor = distributor(&documents, &BoardConfig::default());
    distributor.subscribe()?;

    let result = distributor.subscribe();

    ensure!(
        matches!(result, Err(DistributorError::AlreadySubscribed)),
        "expected AlreadySubscribed, got {result:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test]
async fn stream_error_stops_the_distributor(
    documents: Arc<InMemoryDocumentStore>,
) -> eyre::Result<()> {
    seed_task(&documents, &stored_task("t1", TaskStatus::ToDo));
    let mut distributor = distributor(&documents, &BoardConfig::default());
    let mut events = distributor.events();
    distributor.subscribe()?;
    wait_for(&mut events, tasks_changed).await?;

    documents.fail_subscription(
        &CollectionPath::Tasks,
        StoreReadError::Subscription {
            collection: "tasks".to_owned(),
            reason: "permission revoked".to_owned(),
        },
    )?;
    let failure = wait_for(&mut events, |event| matches!(event, BoardEvent::StreamFailed(_))).await?;

    let BoardEvent::StreamFailed(StoreReadError::Subscription { reason, .. }) = failure else {
        bail!("unexpected failure event");
    };
    ensure!(reason == "permission revoked", "reason is forwarded");
    timeout(EVENT_TIMEOUT, async {
        while distributor.is_subscribed() {
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await?;
    ensure!(distributor.to_do().len() == 1, "last good snapshot stays visible");
    Ok(())
}

#[rstest]
#[tokio::test]
async fn refused_subscription_is_reported() {
    let mut documents = MockDocuments::new();
    documents.expect_subscribe_collection().times(1).returning(|collection| {
        Err(StoreReadError::Subscription {
            collection: collection.to_string(),
            reason: "quota exceeded".to_owned(),
        })
    });
    let store = Arc::new(EntityStore::new(Arc::new(documents)));
    let mut distributor = TaskListDistributor::new(store, &BoardConfig::default());

    let result = distributor.subscribe();

    assert!(matches!(result, Err(DistributorError::Read(_))));
    assert!(!distributor.is_subscribed());
}

#[rstest]
#[tokio::test]
async fn search_and_summary_read_the_current_board(
    documents: Arc<InMemoryDocumentStore>,
) -> eyre::Result<()> {
    seed_task(&documents, &task_with(Some("a"), "Fix login", TaskStatus::ToDo, None));
    seed_task(&documents, &task_with(Some("b"), "Write docs", TaskStatus::Done, None));
    let mut distributor = distributor(&documents, &BoardConfig::default());
    let mut events = distributor.events();
    distributor.subscribe()?;
    wait_for(&mut events, tasks_changed).await?;

    let found = distributor.search("LOGIN");
    let summary = distributor.summary(&mockable::DefaultClock);

    ensure!(found.len() == 1, "one task matches");
    ensure!(summary.total() == 2, "summary counts every task");
    ensure!(summary.count(TaskStatus::Done) == 1, "done column counted");
    Ok(())
}
