//! In-memory integration tests for bin operations.

use std::sync::Arc;

use super::helpers::{Session, backend, reviewer};
use atelier::task::{
    adapters::memory::InMemoryTaskBackend,
    domain::{NewTask, TaskDomainError, TaskId, TaskStatus, TaskView},
    services::TaskWorkflowError,
};
use eyre::ensure;
use rstest::rstest;

async fn seed_three(session: &Session) -> eyre::Result<Vec<TaskId>> {
    let mut ids = Vec::new();
    for description in ["Logo refresh", "Brochure", "Signage"] {
        ids.push(session.service.create_task(NewTask::new(description)).await?.id());
    }
    Ok(ids)
}

fn listed(session: &Session, view: TaskView) -> eyre::Result<Vec<TaskId>> {
    Ok(session.service.replica().read(|store| {
        let mut ids: Vec<TaskId> = store.tasks_in_view(view).into_iter().map(|t| t.id()).collect();
        ids.sort();
        ids
    })?)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn selected_tasks_move_to_bin_and_back(
    backend: Arc<InMemoryTaskBackend>,
) -> eyre::Result<()> {
    let mut session = Session::open(&backend);
    let mut ids = seed_three(&session).await?;
    ids.sort();
    let bystander = session.service.create_task(NewTask::new("Keep me")).await?;
    for id in &ids {
        session.service.bulk().select(*id)?;
    }

    session.service.delete_tasks(&reviewer(), &ids).await?;
    session.drain().await;
    ensure!(listed(&session, TaskView::Bin)? == ids);
    ensure!(listed(&session, TaskView::Active)? == vec![bystander.id()]);

    session.service.restore_tasks(&reviewer(), &ids).await?;
    session.drain().await;
    ensure!(listed(&session, TaskView::Bin)?.is_empty());
    ensure!(listed(&session, TaskView::Active)?.len() == 4);
    for id in &ids {
        ensure!(session.service.task(*id)?.status() == TaskStatus::Todo);
        ensure!(backend.stored(*id)?.is_some_and(|row| !row.is_deleted()));
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_bulk_delete_keeps_every_task_active(
    backend: Arc<InMemoryTaskBackend>,
) -> eyre::Result<()> {
    let session = Session::open(&backend);
    let ids = seed_three(&session).await?;
    backend.fail_next_writes(1)?;

    let result = session.service.delete_tasks(&reviewer(), &ids).await;

    ensure!(matches!(result, Err(TaskWorkflowError::Backend(_))));
    ensure!(listed(&session, TaskView::Bin)?.is_empty());
    ensure!(listed(&session, TaskView::Active)?.len() == 3);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn parent_cannot_be_binned_without_its_child(
    backend: Arc<InMemoryTaskBackend>,
) -> eyre::Result<()> {
    let session = Session::open(&backend);
    let parent = session.service.create_task(NewTask::new("Campaign")).await?;
    let mut fields = NewTask::new("Campaign teaser");
    fields.parent_task_id = Some(parent.id());
    let child = session.service.create_task(fields).await?;

    let alone = session.service.delete_task(&reviewer(), parent.id()).await;
    ensure!(matches!(
        alone,
        Err(TaskWorkflowError::Domain(TaskDomainError::ActiveChildExists { .. }))
    ));

    session
        .service
        .delete_tasks(&reviewer(), &[parent.id(), child.id()])
        .await?;
    let child_alone = session.service.restore_task(&reviewer(), child.id()).await;
    ensure!(matches!(
        child_alone,
        Err(TaskWorkflowError::Domain(TaskDomainError::ParentUnavailable(_)))
    ));
    session
        .service
        .restore_tasks(&reviewer(), &[child.id(), parent.id()])
        .await?;
    ensure!(listed(&session, TaskView::Bin)?.is_empty());
    Ok(())
}
