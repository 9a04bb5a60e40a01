//! Contact directory feeding edit sessions.

use super::helpers::{Board, EVENT_TIMEOUT, board};
use eyre::{OptionExt, ensure};
use rstest::rstest;
use std::sync::Arc;
use taskboard::contact::services::{ContactDirectory, DirectoryEvent};
use taskboard::task::domain::{Category, TaskStatus};
use taskboard::task::services::{EditSession, TaskEditCoordinator};
use tokio::sync::broadcast;
use tokio::time::timeout;

async fn wait_for_contacts(
    directory: &ContactDirectory<taskboard::store::adapters::memory::InMemoryDocumentStore>,
    events: &mut broadcast::Receiver<DirectoryEvent>,
    count: usize,
) -> eyre::Result<()> {
    while directory.contacts().len() != count {
        timeout(EVENT_TIMEOUT, events.recv()).await??;
    }
    Ok(())
}

#[rstest]
#[tokio::test]
async fn deleted_contact_is_dropped_when_the_task_is_reloaded(board: Board) -> eyre::Result<()> {
    let mut directory = ContactDirectory::new(Arc::clone(&board.store), board.config.event_capacity);
    let mut events = directory.events();
    directory.subscribe()?;
    let anna = directory
        .create_contact("Anna Berg", "anna@example.com", None)
        .await?;
    let ben = directory
        .create_contact("Ben Cole", "ben@example.com", Some("0123".to_owned()))
        .await?;
    wait_for_contacts(&directory, &mut events, 2).await?;

    let coordinator = TaskEditCoordinator::new(Arc::clone(&board.store));
    let mut session = EditSession::from_config(&board.config);
    coordinator.begin_create(&mut session, TaskStatus::ToDo);
    session.basic.title = "Pair on parser".to_owned();
    session.basic.due_date = "2026-11-02".to_owned();
    session.classification.set_category(Some(Category::Technical));
    let options = directory.filter("a");
    ensure!(options.len() == 1, "filter narrows the dropdown");
    session
        .contacts
        .select(options.into_iter().next().ok_or_eyre("anna matches")?);
    ensure!(session.contacts.toggle(&ben), "ben selected");
    let saved = coordinator.save(&mut session).await?;
    ensure!(saved.assigned_to().len() == 2, "both contacts assigned");

    directory.delete_contact(ben.id()).await?;
    wait_for_contacts(&directory, &mut events, 1).await?;

    coordinator
        .load(&mut session, &saved, directory.contacts().as_slice())
        .await?;
    ensure!(
        session.contacts.ids().into_iter().collect::<Vec<_>>() == [anna.id().clone()],
        "only known contacts are selected"
    );
    ensure!(
        directory.resolve(saved.assigned_to()).len() == 1,
        "directory resolves the surviving contact"
    );
    Ok(())
}
