//! When steps for task workflow BDD scenarios.

use super::world::{ScenarioClock, TaskWorkflowWorld, reviewer, run_async};
use atelier::task::domain::{CorrectionRequest, PostingRequest, TaskStatus, TaskType, TaskView, UserId};
use atelier::task::services::{BulkAction, StatusChangeRequest};
use chrono::Days;
use eyre::WrapErr;
use rstest_bdd_macros::when;

#[when(r#"the assignee moves the task to "{status}""#)]
fn assignee_moves_task(world: &mut TaskWorkflowWorld, status: String) -> Result<(), eyre::Report> {
    let target = TaskStatus::try_from(status.as_str())?;
    let task_id = world.task()?.id();
    let assignee = world.assignee()?.clone();
    let updated = run_async(world.service.update_task_status(
        &assignee,
        StatusChangeRequest::new(task_id, target, TaskView::Active),
    ))
    .wrap_err("assignee status change")?;
    world.current_task = Some(updated);
    Ok(())
}

#[when(r#"reviewer "{author}" requests corrections with note "{note}""#)]
fn reviewer_requests_corrections(
    world: &mut TaskWorkflowWorld,
    author: String,
    note: String,
) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let request = StatusChangeRequest::new(task_id, TaskStatus::Corrections, TaskView::UnderReview)
        .with_correction(CorrectionRequest::new(note, UserId::new(author.as_str())?));
    let result = run_async(world.service.update_task_status(&reviewer(&author)?, request));
    if let Ok(ref updated) = result {
        world.current_task = Some(updated.clone());
    }
    world.last_result = Some(result);
    Ok(())
}

#[when(r#"reviewer "{author}" requests corrections without a note"#)]
fn reviewer_requests_corrections_without_note(
    world: &mut TaskWorkflowWorld,
    author: String,
) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let request = StatusChangeRequest::new(task_id, TaskStatus::Corrections, TaskView::UnderReview);
    let result = run_async(world.service.update_task_status(&reviewer(&author)?, request));
    world.last_result = Some(result);
    Ok(())
}

#[when(r#"reviewer "{author}" re-assigns the task to "{assignee}" as "{task_type}" for tomorrow"#)]
fn reviewer_reassigns_for_posting(
    world: &mut TaskWorkflowWorld,
    author: String,
    assignee: String,
    task_type: String,
) -> Result<(), eyre::Report> {
    let source_id = world.task()?.id();
    let tomorrow = ScenarioClock::today()
        .checked_add_days(Days::new(1))
        .ok_or_else(|| eyre::eyre!("date overflow"))?;
    let request = PostingRequest::new(UserId::new(assignee)?, TaskType::new(task_type)?, tomorrow);
    let child = run_async(world.service.spawn_posting(&reviewer(&author)?, source_id, request))
        .wrap_err("spawn posting task")?;
    world.posting_task = Some(child);
    Ok(())
}

#[when("the selected tasks are deleted")]
fn delete_selected(world: &mut TaskWorkflowWorld) -> Result<(), eyre::Report> {
    let bulk = world.service.bulk();
    let ids = bulk.selected_ids()?;
    run_async(bulk.execute(&reviewer("u1")?, BulkAction::SoftDelete, &ids))
    .wrap_err("bulk delete")?;
    Ok(())
}

#[when("the deleted tasks are restored")]
fn restore_deleted(world: &mut TaskWorkflowWorld) -> Result<(), eyre::Report> {
    let ids: Vec<_> = world.bulk_tasks.iter().map(|(id, _)| *id).collect();
    run_async(world.service.restore_tasks(&reviewer("u1")?, &ids)).wrap_err("bulk restore")?;
    Ok(())
}
