//! Spawning of derived tasks from completed tasks and from schedules.

use super::{
    TaskWorkflowError, TaskWorkflowResult, optimistic::commit_optimistic, reconciler::enrich,
};
use crate::config::WorkflowConfig;
use crate::task::{
    domain::{
        Actor, PostingRequest, Schedule, Task, TaskDomainError, TaskId, ensure_can_adopt,
        ensure_can_spawn_posting,
    },
    ports::{TaskBackend, TaskDirectory},
    store::{PendingPatch, SessionReplica},
};
use mockable::Clock;
use std::sync::Arc;

/// Creates child tasks that point back at their parent.
///
/// The at-most-one-active-child rule is checked against the session replica
/// before any write; the backend enforces it again at insert.
#[derive(Clone)]
pub struct PostingSpawner<B, D, C>
where
    B: TaskBackend,
    D: TaskDirectory,
    C: Clock + Send + Sync,
{
    backend: Arc<B>,
    directory: Arc<D>,
    replica: SessionReplica,
    clock: Arc<C>,
    config: WorkflowConfig,
}

impl<B, D, C> PostingSpawner<B, D, C>
where
    B: TaskBackend,
    D: TaskDirectory,
    C: Clock + Send + Sync,
{
    /// Creates a spawner operating on `replica`.
    #[must_use]
    pub const fn new(
        backend: Arc<B>,
        directory: Arc<D>,
        replica: SessionReplica,
        clock: Arc<C>,
        config: WorkflowConfig,
    ) -> Self {
        Self {
            backend,
            directory,
            replica,
            clock,
            config,
        }
    }

    /// Returns whether "re-assign for posting" should be offered for the
    /// task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError::NotFound`] when the task is not held.
    pub fn can_spawn(&self, source_id: TaskId) -> TaskWorkflowResult<bool> {
        let source = self.held(source_id)?;
        Ok(self
            .replica
            .read(|store| ensure_can_spawn_posting(&source, store.iter()).is_ok())?)
    }

    /// Creates the posting task of a completed top-level task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError::PermissionDenied`] for non-reviewers,
    /// [`TaskWorkflowError::NotFound`] for unknown sources, domain errors for
    /// failed preconditions or a type outside the assignee's defaults, and
    /// [`TaskWorkflowError::Backend`] after rollback on persistence failure.
    pub async fn spawn_posting(
        &self,
        actor: &Actor,
        source_id: TaskId,
        request: PostingRequest,
    ) -> TaskWorkflowResult<Task> {
        if !actor.is_reviewer() {
            return Err(TaskWorkflowError::PermissionDenied {
                user: actor.user_id().clone(),
                action: "re-assign a task for posting",
            });
        }
        let source = self.held(source_id)?;
        self.replica
            .read(|store| ensure_can_spawn_posting(&source, store.iter()))??;

        let allowed_types = self
            .directory
            .default_task_types(&request.assignee_id)
            .await?;
        if !allowed_types.contains(&request.task_type) {
            return Err(TaskDomainError::TaskTypeNotAllowed {
                task_type: request.task_type,
                assignee: request.assignee_id,
            }
            .into());
        }

        let today = self.clock.utc().date_naive();
        let child = self
            .insert(Task::new(request.derive_from(&source, today), &*self.clock)?)
            .await?;
        tracing::info!(
            parent = %source_id,
            child = %child.id(),
            assignee = %request.assignee_id,
            "posting task created"
        );
        Ok(child)
    }

    /// Creates the task triggered by a schedule entry.
    ///
    /// When the schedule names a source task, the new task becomes its child
    /// under the same rules as a posting task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::ParentUnavailable`] when the source is not
    /// held or is in the bin, [`TaskDomainError::ActiveChildExists`] when it
    /// already has an active child, and [`TaskWorkflowError::Backend`] after
    /// rollback on persistence failure.
    pub async fn create_task_from_schedule(&self, schedule: &Schedule) -> TaskWorkflowResult<Task> {
        if let Some(source_id) = schedule.source_task_id {
            let parent = self
                .replica
                .get(source_id)?
                .ok_or(TaskDomainError::ParentUnavailable(source_id))?;
            self.replica
                .read(|store| ensure_can_adopt(&parent, store.iter()))??;
        }

        let today = self.clock.utc().date_naive();
        let task = self
            .insert(Task::new(schedule.derive_task(today), &*self.clock)?)
            .await?;
        tracing::info!(
            schedule = %schedule.id,
            task_id = %task.id(),
            "task created from schedule"
        );
        Ok(task)
    }

    async fn insert(&self, task: Task) -> TaskWorkflowResult<Task> {
        let enriched = enrich(&*self.directory, task).await?;
        commit_optimistic(
            &self.replica,
            self.config.persistence_timeout,
            vec![PendingPatch::Upsert(enriched.clone())],
            self.backend.insert(&enriched),
        )
        .await?;
        Ok(enriched)
    }

    fn held(&self, task_id: TaskId) -> TaskWorkflowResult<Task> {
        self.replica
            .get(task_id)?
            .ok_or(TaskWorkflowError::NotFound(task_id))
    }
}
