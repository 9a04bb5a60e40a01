//! Round trips between the board services and the live task stream.

use super::helpers::{Board, board, wait_for_board};
use eyre::{OptionExt, ensure};
use rstest::rstest;
use std::sync::Arc;
use taskboard::store::ports::StoreWriteError;
use taskboard::task::domain::{BoardBuckets, Category, Task, TaskStatus};
use taskboard::task::services::{
    DragDropCoordinator, DropEvent, DropOutcome, EditSession, SubtaskProgress,
    TaskCommandService, TaskEditCoordinator,
};

/// Creates a task with the given subtasks through the edit coordinator.
async fn create_task(
    board: &Board,
    title: &str,
    status: TaskStatus,
    subtasks: &[&str],
) -> eyre::Result<Task> {
    let coordinator = TaskEditCoordinator::new(Arc::clone(&board.store));
    let mut session = EditSession::from_config(&board.config);
    coordinator.begin_create(&mut session, status);
    session.basic.title = title.to_owned();
    session.basic.due_date = "2026-11-20".to_owned();
    session.classification.set_category(Some(Category::Technical));
    for text in subtasks {
        session.subtasks.add(text)?;
    }
    Ok(coordinator.save(&mut session).await?)
}

fn local_copy(buckets: &Arc<BoardBuckets>) -> BoardBuckets {
    BoardBuckets::clone(buckets)
}

#[rstest]
#[tokio::test]
async fn created_task_appears_in_its_column(board: Board) -> eyre::Result<()> {
    let mut distributor = board.distributor();
    let mut events = distributor.events();
    distributor.subscribe()?;

    let task = create_task(&board, "Plan sprint", TaskStatus::InProgress, &["Agenda"]).await?;
    let task_id = task.id().cloned().ok_or_eyre("created task has an id")?;

    wait_for_board(&distributor, &mut events, |view| {
        view.in_progress().len() == 1 && view.subtasks(&task_id).len() == 1
    })
    .await?;

    ensure!(distributor.to_do().is_empty(), "created in the requested column");
    ensure!(
        distributor.subtask_progress(&task_id) == SubtaskProgress { completed: 0, total: 1 },
        "subtask tracked"
    );
    Ok(())
}

#[rstest]
#[tokio::test]
async fn dropped_task_is_persisted_and_redistributed(board: Board) -> eyre::Result<()> {
    let mut distributor = board.distributor();
    let mut events = distributor.events();
    distributor.subscribe()?;
    create_task(&board, "Review PR", TaskStatus::ToDo, &[]).await?;
    wait_for_board(&distributor, &mut events, |view| view.to_do().len() == 1).await?;

    let mut local = local_copy(&distributor.buckets());
    let mut drag_drop = DragDropCoordinator::new(Arc::clone(&board.store));
    let outcome = drag_drop.handle_drop(
        &mut local,
        &DropEvent::between(TaskStatus::ToDo, TaskStatus::Done, 0, 0),
        |_| {},
    );
    let DropOutcome::Transferred {
        persistence: Some(persistence),
        ..
    } = outcome
    else {
        eyre::bail!("expected a persisted transfer");
    };
    persistence.await??;

    wait_for_board(&distributor, &mut events, |view| view.done().len() == 1).await?;
    ensure!(distributor.to_do().is_empty(), "task left to-do");
    ensure!(*distributor.buckets() == local, "stream agrees with the optimistic move");
    Ok(())
}

#[rstest]
#[tokio::test]
async fn failed_drop_diverges_until_the_next_push(board: Board) -> eyre::Result<()> {
    let mut distributor = board.distributor();
    let mut events = distributor.events();
    distributor.subscribe()?;
    create_task(&board, "Fix flaky test", TaskStatus::ToDo, &[]).await?;
    wait_for_board(&distributor, &mut events, |view| view.to_do().len() == 1).await?;
    board
        .documents
        .fail_writes(StoreWriteError::Unavailable("offline".to_owned()))?;

    let mut local = local_copy(&distributor.buckets());
    let mut drag_drop = DragDropCoordinator::new(Arc::clone(&board.store));
    let outcome = drag_drop.handle_drop(
        &mut local,
        &DropEvent::between(TaskStatus::ToDo, TaskStatus::Done, 0, 0),
        |_| {},
    );
    let DropOutcome::Transferred {
        persistence: Some(persistence),
        ..
    } = outcome
    else {
        eyre::bail!("expected a persisted transfer");
    };
    let write = persistence.await?;

    ensure!(write.is_err(), "status write failed");
    ensure!(local.bucket(TaskStatus::Done).len() == 1, "local view keeps the move");
    ensure!(distributor.to_do().len() == 1, "stored view is unchanged");

    board.documents.restore_writes()?;
    create_task(&board, "Unrelated", TaskStatus::InProgress, &[]).await?;
    wait_for_board(&distributor, &mut events, |view| view.in_progress().len() == 1).await?;
    ensure!(distributor.to_do().len() == 1, "next push shows the stored status");
    Ok(())
}

#[rstest]
#[tokio::test]
async fn deleted_task_leaves_the_board_with_its_subtasks(board: Board) -> eyre::Result<()> {
    let mut distributor = board.distributor();
    let mut events = distributor.events();
    distributor.subscribe()?;
    let task = create_task(&board, "Obsolete", TaskStatus::AwaitFeedback, &["a", "b"]).await?;
    let task_id = task.id().cloned().ok_or_eyre("created task has an id")?;
    wait_for_board(&distributor, &mut events, |view| view.await_feedback().len() == 1).await?;

    TaskCommandService::new(Arc::clone(&board.store))
        .delete_task(&task_id)
        .await?;

    wait_for_board(&distributor, &mut events, |view| view.buckets().is_empty()).await?;
    ensure!(distributor.subtasks(&task_id).is_empty(), "subtask cache dropped");
    let remaining = board.store.fetch_subtasks(&task_id).await?;
    ensure!(remaining.is_empty(), "subtask documents deleted");
    Ok(())
}

#[rstest]
#[tokio::test]
async fn subtask_toggle_updates_progress(board: Board) -> eyre::Result<()> {
    let mut distributor = board.distributor();
    let mut events = distributor.events();
    distributor.subscribe()?;
    let task = create_task(&board, "Checklist", TaskStatus::ToDo, &["one", "two"]).await?;
    let task_id = task.id().cloned().ok_or_eyre("created task has an id")?;
    wait_for_board(&distributor, &mut events, |view| view.subtasks(&task_id).len() == 2).await?;

    let subtask = distributor
        .subtasks(&task_id)
        .into_iter()
        .next()
        .ok_or_eyre("cached subtask")?;
    TaskCommandService::new(Arc::clone(&board.store))
        .toggle_subtask(&task_id, &subtask)
        .await?;

    wait_for_board(&distributor, &mut events, |view| {
        view.subtask_progress(&task_id).completed == 1
    })
    .await?;
    Ok(())
}
