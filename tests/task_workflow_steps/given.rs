//! Given steps for task workflow BDD scenarios.

use super::world::{TaskWorkflowWorld, member, reviewer, run_async};
use atelier::task::domain::{NewTask, TaskStatus, TaskType, TaskView, UserId};
use atelier::task::services::StatusChangeRequest;
use chrono::NaiveDate;
use eyre::WrapErr;
use rstest_bdd_macros::given;

#[given(r#"a task "{description}" assigned to "{assignee}" due on "{deadline}""#)]
fn assigned_task(
    world: &mut TaskWorkflowWorld,
    description: String,
    assignee: String,
    deadline: String,
) -> Result<(), eyre::Report> {
    let due = NaiveDate::parse_from_str(&deadline, "%Y-%m-%d")
        .wrap_err("parse scenario deadline")?;
    let fields = NewTask::new(description)
        .with_assignee(UserId::new(assignee.as_str())?)
        .with_deadline(due);
    let created = run_async(world.service.create_task(fields)).wrap_err("create scenario task")?;
    world.assignee = Some(member(&assignee)?);
    world.current_task = Some(created);
    Ok(())
}

#[given("the assignee has submitted the task for review")]
fn submitted_for_review(world: &mut TaskWorkflowWorld) -> Result<(), eyre::Report> {
    submit_for_review(world)
}

fn submit_for_review(world: &mut TaskWorkflowWorld) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let assignee = world.assignee()?.clone();
    for target in [TaskStatus::InProgress, TaskStatus::Review] {
        let updated = run_async(world.service.update_task_status(
            &assignee,
            StatusChangeRequest::new(task_id, target, TaskView::Active),
        ))
        .wrap_err("submit scenario task for review")?;
        world.current_task = Some(updated);
    }
    Ok(())
}

#[given(r#"an approved task "{description}" of type "{task_type}""#)]
fn approved_task(
    world: &mut TaskWorkflowWorld,
    description: String,
    task_type: String,
) -> Result<(), eyre::Report> {
    let fields = NewTask::new(description)
        .with_type(TaskType::new(task_type)?)
        .with_assignee(UserId::new("dana")?);
    let created = run_async(world.service.create_task(fields)).wrap_err("create source task")?;
    world.assignee = Some(member("dana")?);
    world.current_task = Some(created);
    submit_for_review(world)?;

    let task_id = world.task()?.id();
    let approved = run_async(world.service.update_task_status(
        &reviewer("u1")?,
        StatusChangeRequest::new(task_id, TaskStatus::Approved, TaskView::UnderReview),
    ))
    .wrap_err("approve source task")?;
    world.current_task = Some(approved);
    Ok(())
}

#[given("{count:usize} tasks in the active view")]
fn tasks_in_active_view(world: &mut TaskWorkflowWorld, count: usize) -> Result<(), eyre::Report> {
    for index in 0..count {
        let created = run_async(
            world
                .service
                .create_task(NewTask::new(format!("Bulk task {index}"))),
        )
        .wrap_err("create bulk task")?;
        world.bulk_tasks.push((created.id(), created.status()));
    }
    Ok(())
}

#[given("every task in the active view is selected")]
fn select_active_tasks(world: &mut TaskWorkflowWorld) -> Result<(), eyre::Report> {
    let bulk = world.service.bulk();
    bulk.switch_view(TaskView::Active)?;
    bulk.select_all_in_view()?;
    Ok(())
}
