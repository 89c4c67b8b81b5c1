//! In-memory integration tests for task creation, transitions and spawns.

use std::sync::Arc;

use super::helpers::{FixedClock, Session, assignee, backend, reviewer, task_type, user};
use atelier::task::{
    adapters::memory::InMemoryTaskBackend,
    domain::{
        CorrectionRequest, NewTask, PostingRequest, PostingStatus, TaskDomainError, TaskStatus,
        TaskView,
    },
    services::{StatusChangeRequest, TaskWorkflowError},
};
use chrono::{Days, NaiveDate};
use eyre::ensure;
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn review_cycle_records_corrections(
    backend: Arc<InMemoryTaskBackend>,
) -> eyre::Result<()> {
    let mut session = Session::open(&backend);
    let service = &session.service;
    let deadline = NaiveDate::from_ymd_opt(2024, 6, 1).ok_or_else(|| eyre::eyre!("bad date"))?;
    let created = service
        .create_task(
            NewTask::new("Spring poster")
                .with_assignee(user("dana"))
                .with_deadline(deadline),
        )
        .await?;
    ensure!(created.status() == TaskStatus::Todo);

    for target in [TaskStatus::InProgress, TaskStatus::Review] {
        service
            .update_task_status(
                &assignee(),
                StatusChangeRequest::new(created.id(), target, TaskView::Active),
            )
            .await?;
    }
    let corrected = service
        .update_task_status(
            &reviewer(),
            StatusChangeRequest::new(created.id(), TaskStatus::Corrections, TaskView::UnderReview)
                .with_correction(CorrectionRequest::new("fix colors", user("u1"))),
        )
        .await?;
    session.drain().await;

    let held = session.service.task(created.id())?;
    ensure!(held == corrected);
    ensure!(held.status() == TaskStatus::Corrections);
    ensure!(held.revisions().corrections == 1);
    ensure!(held.revisions().recreations == 0);
    let note = held
        .corrections()
        .first()
        .ok_or_else(|| eyre::eyre!("missing correction note"))?;
    ensure!(note.note == "fix colors");
    ensure!(note.author_id == user("u1"));
    ensure!(held.deadline() == Some(deadline));
    ensure!(
        held.joins().assignee.as_ref().map(|p| p.full_name.as_str()) == Some("Dana Reyes")
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn local_insert_echo_does_not_duplicate(backend: Arc<InMemoryTaskBackend>) -> eyre::Result<()> {
    let mut session = Session::open(&backend);
    session
        .service
        .create_task(NewTask::new("Newsletter copy"))
        .await?;

    let applied = session.drain().await;

    ensure!(applied == 1);
    let held = session.service.replica().read(|store| store.len())?;
    ensure!(held == 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn posting_child_is_due_today_for_tomorrow(
    backend: Arc<InMemoryTaskBackend>,
) -> eyre::Result<()> {
    let session = Session::open(&backend);
    let service = &session.service;
    let source = service
        .create_task(
            NewTask::new("Poster")
                .with_type(task_type("Poster"))
                .with_assignee(user("dana")),
        )
        .await?;
    for target in [TaskStatus::InProgress, TaskStatus::Review] {
        service
            .update_task_status(
                &assignee(),
                StatusChangeRequest::new(source.id(), target, TaskView::Active),
            )
            .await?;
    }
    service
        .update_task_status(
            &reviewer(),
            StatusChangeRequest::new(source.id(), TaskStatus::Approved, TaskView::UnderReview),
        )
        .await?;

    let today = FixedClock::today();
    let tomorrow = today
        .checked_add_days(Days::new(1))
        .ok_or_else(|| eyre::eyre!("date overflow"))?;
    let child = service
        .spawn_posting(
            &reviewer(),
            source.id(),
            PostingRequest::new(user("poppy"), task_type("Posting"), tomorrow),
        )
        .await?;

    ensure!(child.parent_task_id() == Some(source.id()));
    ensure!(child.posting_status() == Some(PostingStatus::Planned));
    ensure!(child.deadline() == Some(today));

    let second = service
        .spawn_posting(
            &reviewer(),
            source.id(),
            PostingRequest::new(user("poppy"), task_type("Posting"), tomorrow),
        )
        .await;
    ensure!(matches!(
        second,
        Err(TaskWorkflowError::Domain(TaskDomainError::ActiveChildExists { .. }))
    ));

    let posted = service
        .update_task_posting_status(&assignee(), child.id(), PostingStatus::Scheduled)
        .await?;
    ensure!(posted.posting_status() == Some(PostingStatus::Scheduled));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_task_respects_single_active_child(
    backend: Arc<InMemoryTaskBackend>,
) -> eyre::Result<()> {
    let session = Session::open(&backend);
    let service = &session.service;
    let parent = service.create_task(NewTask::new("Launch video")).await?;
    let mut first = NewTask::new("Cut teaser");
    first.parent_task_id = Some(parent.id());
    service.create_task(first).await?;

    let mut second = NewTask::new("Cut trailer");
    second.parent_task_id = Some(parent.id());
    let result = service.create_task(second).await;

    ensure!(matches!(
        result,
        Err(TaskWorkflowError::Domain(TaskDomainError::ActiveChildExists { .. }))
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn load_replaces_replica_with_enriched_rows(
    backend: Arc<InMemoryTaskBackend>,
) -> eyre::Result<()> {
    let writer = Session::open(&backend);
    for description in ["Reel", "Story", "Carousel"] {
        writer
            .service
            .create_task(NewTask::new(description).with_assignee(user("dana")))
            .await?;
    }

    let reader = Session::open(&backend);
    let loaded = reader.service.load().await?;

    ensure!(loaded == 3);
    let listed = reader.service.replica().read(|store| {
        store
            .tasks_in_view(TaskView::Active)
            .into_iter()
            .all(|task| task.joins().assignee.is_some())
    })?;
    ensure!(listed);
    Ok(())
}
