//! Create and edit flows through the composite edit coordinator.

use super::helpers::{Board, board, wait_for_board};
use eyre::{OptionExt, ensure};
use rstest::rstest;
use std::sync::Arc;
use taskboard::config::BoardConfig;
use taskboard::store::adapters::memory::WriteOperation;
use taskboard::task::domain::{Category, Priority, SubtaskId, TaskStatus};
use taskboard::task::services::{EditError, EditSession, TaskEditCoordinator};

fn write_kinds(board: &Board) -> eyre::Result<Vec<&'static str>> {
    Ok(board
        .documents
        .write_log()?
        .iter()
        .map(|operation| match operation {
            WriteOperation::Create { .. } => "create",
            WriteOperation::Update { .. } => "update",
            WriteOperation::Delete { .. } => "delete",
        })
        .collect())
}

#[rstest]
#[tokio::test]
async fn edited_task_round_trips_through_the_board(board: Board) -> eyre::Result<()> {
    let coordinator = TaskEditCoordinator::new(Arc::clone(&board.store));
    let mut distributor = board.distributor();
    let mut events = distributor.events();
    distributor.subscribe()?;

    let mut session = EditSession::from_config(&board.config);
    session.basic.title = "Write changelog".to_owned();
    session.basic.due_date = "2026-12-01".to_owned();
    session.classification.set_category(Some(Category::UserStory));
    session.subtasks.add("x")?;
    session.subtasks.add("y")?;
    let created = coordinator.save(&mut session).await?;
    let task_id = created.id().cloned().ok_or_eyre("created task has an id")?;
    wait_for_board(&distributor, &mut events, |view| {
        view.to_do().len() == 1 && view.subtasks(&task_id).len() == 2
    })
    .await?;

    let stored = distributor
        .buckets()
        .find(&task_id)
        .cloned()
        .ok_or_eyre("task on the board")?;
    coordinator.load(&mut session, &stored, &[]).await?;
    let ids: Vec<SubtaskId> = session
        .subtasks
        .items()
        .iter()
        .map(|subtask| subtask.id().clone())
        .collect();
    let [first, second] = ids.as_slice() else {
        eyre::bail!("expected two loaded subtasks, got {}", ids.len());
    };
    ensure!(session.subtasks.rename(first, "x2"), "rename kept subtask");
    session.subtasks.remove(second);
    session.subtasks.add("z")?;
    session.classification.set_priority(Priority::Urgent);

    let saved = coordinator.save(&mut session).await?;

    ensure!(saved.id() == Some(&task_id), "identifier kept");
    wait_for_board(&distributor, &mut events, |view| {
        let texts: Vec<String> = view
            .subtasks(&task_id)
            .iter()
            .map(|subtask| subtask.text().to_owned())
            .collect();
        texts == ["x2", "z"]
            && view
                .buckets()
                .find(&task_id)
                .is_some_and(|task| task.priority() == Priority::Urgent)
    })
    .await?;
    ensure!(
        write_kinds(&board)?
            == [
                "create", "create", "create", "update", "delete", "update", "create"
            ],
        "create flow, then update, delete, update, create"
    );
    Ok(())
}

#[rstest]
#[tokio::test]
async fn incomplete_form_never_reaches_the_store(board: Board) -> eyre::Result<()> {
    let coordinator = TaskEditCoordinator::new(Arc::clone(&board.store));
    let mut session = EditSession::from_config(&board.config);
    session.basic.title = "No category".to_owned();

    let result = coordinator.save(&mut session).await;

    let Err(EditError::Validation(errors)) = result else {
        eyre::bail!("expected validation to block the save");
    };
    ensure!(!errors.title && errors.category && errors.due_date, "flags set");
    ensure!(write_kinds(&board)?.is_empty(), "nothing written");
    Ok(())
}

#[rstest]
#[tokio::test]
async fn configured_default_priority_seeds_new_sessions(board: Board) -> eyre::Result<()> {
    let config = BoardConfig::from_toml_str("default_priority = \"low\"")?;
    let coordinator = TaskEditCoordinator::new(Arc::clone(&board.store));
    let mut session = EditSession::from_config(&config);
    coordinator.begin_create(&mut session, TaskStatus::Done);
    session.basic.title = "Archive notes".to_owned();
    session.basic.due_date = "2026-12-24".to_owned();
    session.classification.set_category(Some(Category::Technical));

    let saved = coordinator.save(&mut session).await?;

    ensure!(saved.priority() == Priority::Low, "default priority applied");
    ensure!(saved.status() == TaskStatus::Done, "created in the chosen column");
    ensure!(
        session.classification.priority() == Priority::Low,
        "cleared session keeps the configured default"
    );
    Ok(())
}
