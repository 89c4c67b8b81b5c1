//! In-memory integration tests for sessions writing before they reconcile.

use std::sync::Arc;

use super::helpers::{Session, assignee, backend, reviewer, task_type, user};
use atelier::task::{
    adapters::memory::InMemoryTaskBackend,
    domain::{CorrectionRequest, NewTask, PostingStatus, TaskStatus, TaskView},
    ports::TaskBackendError,
    services::{BulkAction, StatusChangeRequest, TaskWorkflowError},
    store::PendingPatch,
};
use eyre::ensure;
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stale_status_change_cannot_unbin_task(
    backend: Arc<InMemoryTaskBackend>,
) -> eyre::Result<()> {
    let mut stale = Session::open(&backend);
    let mut binner = Session::open(&backend);
    let created = stale
        .service
        .create_task(NewTask::new("Autumn menu").with_assignee(user("dana")))
        .await?;
    stale.drain().await;
    binner.drain().await;
    binner.service.delete_task(&reviewer(), created.id()).await?;

    let result = stale
        .service
        .update_task_status(
            &assignee(),
            StatusChangeRequest::new(created.id(), TaskStatus::InProgress, TaskView::Active),
        )
        .await;

    ensure!(matches!(
        result,
        Err(TaskWorkflowError::Backend(TaskBackendError::TaskDeleted(id))) if id == created.id()
    ));
    let stored = backend
        .stored(created.id())?
        .ok_or_else(|| eyre::eyre!("row missing"))?;
    ensure!(stored.is_deleted());
    ensure!(stored.status() == TaskStatus::Todo);
    ensure!(stale.service.task(created.id())?.status() == TaskStatus::Todo);

    stale.drain().await;
    binner.drain().await;
    ensure!(stale.service.task(created.id())?.is_deleted());
    let listed = binner
        .service
        .replica()
        .read(|store| store.tasks_in_view(TaskView::Active).len())?;
    ensure!(listed == 0);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stale_status_change_keeps_remote_posting_status(
    backend: Arc<InMemoryTaskBackend>,
) -> eyre::Result<()> {
    let mut stale = Session::open(&backend);
    let mut poster = Session::open(&backend);
    let created = stale
        .service
        .create_task(
            NewTask::new("Post reel")
                .with_type(task_type("Posting"))
                .with_assignee(user("dana")),
        )
        .await?;
    stale.drain().await;
    poster.drain().await;
    poster
        .service
        .update_task_posting_status(&assignee(), created.id(), PostingStatus::Scheduled)
        .await?;

    stale
        .service
        .update_task_status(
            &assignee(),
            StatusChangeRequest::new(created.id(), TaskStatus::InProgress, TaskView::Active),
        )
        .await?;

    let stored = backend
        .stored(created.id())?
        .ok_or_else(|| eyre::eyre!("row missing"))?;
    ensure!(stored.status() == TaskStatus::InProgress);
    ensure!(stored.posting_status() == Some(PostingStatus::Scheduled));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stale_posting_update_keeps_remote_corrections(
    backend: Arc<InMemoryTaskBackend>,
) -> eyre::Result<()> {
    let mut stale = Session::open(&backend);
    let mut reviewing = Session::open(&backend);
    let created = stale
        .service
        .create_task(
            NewTask::new("Post carousel")
                .with_type(task_type("Posting"))
                .with_assignee(user("dana")),
        )
        .await?;
    stale.drain().await;
    reviewing.drain().await;
    for target in [TaskStatus::InProgress, TaskStatus::Review] {
        reviewing
            .service
            .update_task_status(
                &assignee(),
                StatusChangeRequest::new(created.id(), target, TaskView::Active),
            )
            .await?;
    }
    reviewing
        .service
        .update_task_status(
            &reviewer(),
            StatusChangeRequest::new(created.id(), TaskStatus::Corrections, TaskView::UnderReview)
                .with_correction(CorrectionRequest::new("crop the logo", user("u1"))),
        )
        .await?;

    stale
        .service
        .update_task_posting_status(&assignee(), created.id(), PostingStatus::Scheduled)
        .await?;

    let stored = backend
        .stored(created.id())?
        .ok_or_else(|| eyre::eyre!("row missing"))?;
    ensure!(stored.status() == TaskStatus::Corrections);
    ensure!(stored.revisions().corrections == 1);
    ensure!(stored.corrections().len() == 1);
    ensure!(stored.posting_status() == Some(PostingStatus::Scheduled));

    stale.drain().await;
    let seen = stale.service.task(created.id())?;
    ensure!(seen.status() == TaskStatus::Corrections);
    ensure!(seen.posting_status() == Some(PostingStatus::Scheduled));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn remotely_binned_task_leaves_local_selection(
    backend: Arc<InMemoryTaskBackend>,
) -> eyre::Result<()> {
    let mut selecting = Session::open(&backend);
    let mut binner = Session::open(&backend);
    let first = selecting.service.create_task(NewTask::new("Flyer")).await?;
    let second = selecting.service.create_task(NewTask::new("Banner")).await?;
    selecting.drain().await;
    binner.drain().await;
    selecting.service.bulk().select_all_in_view()?;
    ensure!(selecting.service.bulk().selected_ids()?.len() == 2);

    binner.service.delete_task(&reviewer(), first.id()).await?;
    selecting.drain().await;

    ensure!(selecting.service.bulk().selected_ids()? == vec![second.id()]);
    let binned = selecting
        .service
        .bulk()
        .execute_on_selection(&reviewer(), BulkAction::SoftDelete)
        .await?;
    ensure!(binned == 1);
    let stored = backend
        .stored(second.id())?
        .ok_or_else(|| eyre::eyre!("row missing"))?;
    ensure!(stored.is_deleted());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reload_supersedes_pending_writes(
    backend: Arc<InMemoryTaskBackend>,
) -> eyre::Result<()> {
    let writer = Session::open(&backend);
    let reader = Session::open(&backend);
    let created = writer.service.create_task(NewTask::new("Logo refresh")).await?;
    reader.service.load().await?;
    let replica = reader.service.replica();
    let operation = replica.begin(vec![PendingPatch::Remove(created.id())])?;
    ensure!(replica.get(created.id())?.is_none());

    let loaded = reader.service.load().await?;

    ensure!(loaded == 1);
    ensure!(!replica.is_pending(created.id())?);
    ensure!(replica.get(created.id())?.is_some());
    replica.rollback(operation)?;
    ensure!(replica.read(|store| store.len())? == 1);
    Ok(())
}
