//! In-memory integration tests for change-feed reconciliation across sessions.

use std::sync::Arc;

use super::helpers::{Session, assignee, backend, reviewer, user};
use atelier::task::{
    adapters::memory::InMemoryTaskBackend,
    domain::{NewTask, TaskStatus, TaskView},
    services::StatusChangeRequest,
};
use eyre::ensure;
use rstest::rstest;
use std::time::Duration;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn remote_changes_reach_other_sessions(
    backend: Arc<InMemoryTaskBackend>,
) -> eyre::Result<()> {
    let writer = Session::open(&backend);
    let mut reader = Session::open(&backend);
    let created = writer
        .service
        .create_task(NewTask::new("Event recap").with_assignee(user("dana")))
        .await?;
    writer
        .service
        .update_task_status(
            &assignee(),
            StatusChangeRequest::new(created.id(), TaskStatus::InProgress, TaskView::Active),
        )
        .await?;

    let applied = reader.drain().await;

    ensure!(applied == 2);
    let seen = reader.service.task(created.id())?;
    ensure!(seen.status() == TaskStatus::InProgress);
    ensure!(seen.joins().assignee.is_some());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn remote_permanent_delete_purges_local_selection(
    backend: Arc<InMemoryTaskBackend>,
) -> eyre::Result<()> {
    let writer = Session::open(&backend);
    let mut reader = Session::open(&backend);
    let created = writer.service.create_task(NewTask::new("Old flyer")).await?;
    writer.service.delete_task(&reviewer(), created.id()).await?;
    reader.drain().await;
    reader.service.bulk().switch_view(TaskView::Bin)?;
    ensure!(reader.service.bulk().select(created.id())?);

    writer
        .service
        .delete_task_permanently(&reviewer(), created.id())
        .await?;
    reader.drain().await;

    ensure!(reader.service.replica().get(created.id())?.is_none());
    ensure!(reader.service.bulk().selected_ids()?.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn consumer_loop_keeps_replica_in_step(
    backend: Arc<InMemoryTaskBackend>,
) -> eyre::Result<()> {
    let writer = Session::open(&backend);
    let Session { service, feed } = Session::open(&backend);
    let reconciler = service.reconciler().clone();
    let consumer = tokio::spawn(async move { reconciler.run(feed).await });

    for description in ["Menu shoot", "Banner", "Podcast art"] {
        writer.service.create_task(NewTask::new(description)).await?;
    }
    tokio::time::sleep(Duration::from_millis(50)).await;
    let listed = service
        .replica()
        .read(|store| store.tasks_in_view(TaskView::Active).len())?;
    ensure!(listed == 3);

    drop(writer);
    drop(service);
    drop(backend);
    let merged = consumer.await?;
    ensure!(merged == 3);
    Ok(())
}
