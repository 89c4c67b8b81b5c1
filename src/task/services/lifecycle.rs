//! Session façade over the workflow services.

use super::{
    BulkAction, BulkOperationCoordinator, ChangeFeedReconciler, PostingSpawner,
    StatusChangeRequest, StatusTransitionEngine, TaskWorkflowError, TaskWorkflowResult,
    optimistic::commit_optimistic, reconciler::enrich,
};
use crate::config::WorkflowConfig;
use crate::task::{
    domain::{
        Actor, NewTask, PostingRequest, PostingStatus, Schedule, Task, TaskDomainError, TaskId,
        ensure_can_adopt,
    },
    ports::{TaskBackend, TaskBackendError, TaskDirectory},
    store::{PendingPatch, SessionReplica},
};
use mockable::Clock;
use std::sync::Arc;

/// Entry point for one client session.
///
/// All services share the same [`SessionReplica`], so an optimistic write
/// made through one is visible to the others and to the reconciler.
#[derive(Clone)]
pub struct TaskLifecycleService<B, D, C>
where
    B: TaskBackend,
    D: TaskDirectory,
    C: Clock + Send + Sync,
{
    backend: Arc<B>,
    directory: Arc<D>,
    clock: Arc<C>,
    config: WorkflowConfig,
    replica: SessionReplica,
    transitions: StatusTransitionEngine<B, C>,
    spawner: PostingSpawner<B, D, C>,
    reconciler: ChangeFeedReconciler<D>,
    bulk: BulkOperationCoordinator<B>,
}

impl<B, D, C> TaskLifecycleService<B, D, C>
where
    B: TaskBackend,
    D: TaskDirectory,
    C: Clock + Send + Sync,
{
    /// Creates a session with an empty replica.
    #[must_use]
    pub fn new(backend: Arc<B>, directory: Arc<D>, clock: Arc<C>, config: WorkflowConfig) -> Self {
        let replica = SessionReplica::new();
        let transitions = StatusTransitionEngine::new(
            Arc::clone(&backend),
            replica.clone(),
            Arc::clone(&clock),
            config.clone(),
        );
        let spawner = PostingSpawner::new(
            Arc::clone(&backend),
            Arc::clone(&directory),
            replica.clone(),
            Arc::clone(&clock),
            config.clone(),
        );
        let reconciler = ChangeFeedReconciler::new(
            replica.clone(),
            Arc::clone(&directory),
            config.tasks_table.clone(),
        );
        let bulk =
            BulkOperationCoordinator::new(Arc::clone(&backend), replica.clone(), config.clone());
        Self {
            backend,
            directory,
            clock,
            config,
            replica,
            transitions,
            spawner,
            reconciler,
            bulk,
        }
    }

    /// Returns the session replica.
    #[must_use]
    pub const fn replica(&self) -> &SessionReplica {
        &self.replica
    }

    /// Returns the status transition engine.
    #[must_use]
    pub const fn transitions(&self) -> &StatusTransitionEngine<B, C> {
        &self.transitions
    }

    /// Returns the posting spawner.
    #[must_use]
    pub const fn spawner(&self) -> &PostingSpawner<B, D, C> {
        &self.spawner
    }

    /// Returns the change-feed reconciler.
    #[must_use]
    pub const fn reconciler(&self) -> &ChangeFeedReconciler<D> {
        &self.reconciler
    }

    /// Returns the bulk operation coordinator, which also owns the selection.
    #[must_use]
    pub const fn bulk(&self) -> &BulkOperationCoordinator<B> {
        &self.bulk
    }

    /// Fetches every task, enriches it and replaces the replica contents.
    ///
    /// Loaded rows supersede any optimistic write still awaiting its result.
    ///
    /// Returns the number of tasks loaded.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError::Backend`] or
    /// [`TaskWorkflowError::Directory`]; the replica is left untouched.
    pub async fn load(&self) -> TaskWorkflowResult<usize> {
        let rows = tokio::time::timeout(self.config.persistence_timeout, self.backend.list())
            .await
            .unwrap_or_else(|_| Err(TaskBackendError::Timeout(self.config.persistence_timeout)))?;
        let mut tasks = Vec::with_capacity(rows.len());
        for row in rows {
            tasks.push(enrich(&*self.directory, row.without_joins()).await?);
        }
        let count = tasks.len();
        self.replica.reload(tasks)?;
        tracing::info!(count, "task replica loaded");
        Ok(count)
    }

    /// Creates a task.
    ///
    /// A task naming a parent must satisfy the same adoption rules as a
    /// posting task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError::Domain`] for invalid fields or an
    /// unavailable parent, and [`TaskWorkflowError::Backend`] after rollback.
    pub async fn create_task(&self, fields: NewTask) -> TaskWorkflowResult<Task> {
        if let Some(parent_id) = fields.parent_task_id {
            let parent = self
                .replica
                .get(parent_id)?
                .ok_or(TaskDomainError::ParentUnavailable(parent_id))?;
            self.replica
                .read(|store| ensure_can_adopt(&parent, store.iter()))??;
        }
        let task = enrich(&*self.directory, Task::new(fields, &*self.clock)?).await?;
        commit_optimistic(
            &self.replica,
            self.config.persistence_timeout,
            vec![PendingPatch::Upsert(task.clone())],
            self.backend.insert(&task),
        )
        .await?;
        tracing::info!(task_id = %task.id(), "task created");
        Ok(task)
    }

    /// Changes the review status of a task.
    ///
    /// # Errors
    ///
    /// See [`StatusTransitionEngine::update_task_status`].
    pub async fn update_task_status(
        &self,
        actor: &Actor,
        request: StatusChangeRequest,
    ) -> TaskWorkflowResult<Task> {
        self.transitions.update_task_status(actor, request).await
    }

    /// Changes the posting status of a posting task.
    ///
    /// # Errors
    ///
    /// See [`StatusTransitionEngine::update_task_posting_status`].
    pub async fn update_task_posting_status(
        &self,
        actor: &Actor,
        task_id: TaskId,
        status: PostingStatus,
    ) -> TaskWorkflowResult<Task> {
        self.transitions
            .update_task_posting_status(actor, task_id, status)
            .await
    }

    /// Moves one task into the bin.
    ///
    /// # Errors
    ///
    /// See [`BulkOperationCoordinator::execute`].
    pub async fn delete_task(&self, actor: &Actor, task_id: TaskId) -> TaskWorkflowResult<()> {
        self.delete_tasks(actor, &[task_id]).await.map(drop)
    }

    /// Moves tasks into the bin.
    ///
    /// # Errors
    ///
    /// See [`BulkOperationCoordinator::execute`].
    pub async fn delete_tasks(&self, actor: &Actor, ids: &[TaskId]) -> TaskWorkflowResult<usize> {
        self.bulk.execute(actor, BulkAction::SoftDelete, ids).await
    }

    /// Moves one task out of the bin.
    ///
    /// # Errors
    ///
    /// See [`BulkOperationCoordinator::execute`].
    pub async fn restore_task(&self, actor: &Actor, task_id: TaskId) -> TaskWorkflowResult<()> {
        self.restore_tasks(actor, &[task_id]).await.map(drop)
    }

    /// Moves tasks out of the bin.
    ///
    /// # Errors
    ///
    /// See [`BulkOperationCoordinator::execute`].
    pub async fn restore_tasks(&self, actor: &Actor, ids: &[TaskId]) -> TaskWorkflowResult<usize> {
        self.bulk.execute(actor, BulkAction::Restore, ids).await
    }

    /// Removes one binned task for good.
    ///
    /// # Errors
    ///
    /// See [`BulkOperationCoordinator::execute`].
    pub async fn delete_task_permanently(
        &self,
        actor: &Actor,
        task_id: TaskId,
    ) -> TaskWorkflowResult<()> {
        self.delete_tasks_permanently(actor, &[task_id])
            .await
            .map(drop)
    }

    /// Removes binned tasks for good.
    ///
    /// # Errors
    ///
    /// See [`BulkOperationCoordinator::execute`].
    pub async fn delete_tasks_permanently(
        &self,
        actor: &Actor,
        ids: &[TaskId],
    ) -> TaskWorkflowResult<usize> {
        self.bulk
            .execute(actor, BulkAction::DeletePermanently, ids)
            .await
    }

    /// Re-assigns a completed task for posting.
    ///
    /// # Errors
    ///
    /// See [`PostingSpawner::spawn_posting`].
    pub async fn spawn_posting(
        &self,
        actor: &Actor,
        source_id: TaskId,
        request: PostingRequest,
    ) -> TaskWorkflowResult<Task> {
        self.spawner.spawn_posting(actor, source_id, request).await
    }

    /// Creates the task triggered by a schedule entry.
    ///
    /// # Errors
    ///
    /// See [`PostingSpawner::create_task_from_schedule`].
    pub async fn create_task_from_schedule(&self, schedule: &Schedule) -> TaskWorkflowResult<Task> {
        self.spawner.create_task_from_schedule(schedule).await
    }

    /// Returns a held task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError::NotFound`] when the task is not held.
    pub fn task(&self, task_id: TaskId) -> TaskWorkflowResult<Task> {
        self.replica
            .get(task_id)?
            .ok_or(TaskWorkflowError::NotFound(task_id))
    }
}
