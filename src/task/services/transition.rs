//! Status transition engine: validates, applies optimistically, persists.

use super::{TaskWorkflowError, TaskWorkflowResult, optimistic::commit_optimistic};
use crate::config::WorkflowConfig;
use crate::task::{
    domain::{
        Actor, CorrectionRequest, PostingStatus, RevisionTracker, Task, TaskDomainError, TaskId,
        TaskStatus, TaskView, TransitionContext,
    },
    ports::TaskBackend,
    store::{PendingPatch, SessionReplica},
};
use mockable::Clock;
use std::sync::Arc;

/// A requested status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChangeRequest {
    task_id: TaskId,
    target: TaskStatus,
    view: TaskView,
    correction: Option<CorrectionRequest>,
}

impl StatusChangeRequest {
    /// Creates a request to move `task_id` to `target` from `view`.
    #[must_use]
    pub const fn new(task_id: TaskId, target: TaskStatus, view: TaskView) -> Self {
        Self {
            task_id,
            target,
            view,
            correction: None,
        }
    }

    /// Attaches the correction note that a move to `corrections` requires.
    #[must_use]
    pub fn with_correction(mut self, correction: CorrectionRequest) -> Self {
        self.correction = Some(correction);
        self
    }

    /// Returns the task the request targets.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the requested status.
    #[must_use]
    pub const fn target(&self) -> TaskStatus {
        self.target
    }
}

/// Decides whether a status change is legal and executes it.
#[derive(Clone)]
pub struct StatusTransitionEngine<B, C>
where
    B: TaskBackend,
    C: Clock + Send + Sync,
{
    backend: Arc<B>,
    replica: SessionReplica,
    clock: Arc<C>,
    config: WorkflowConfig,
}

impl<B, C> StatusTransitionEngine<B, C>
where
    B: TaskBackend,
    C: Clock + Send + Sync,
{
    /// Creates an engine operating on `replica`.
    #[must_use]
    pub const fn new(
        backend: Arc<B>,
        replica: SessionReplica,
        clock: Arc<C>,
        config: WorkflowConfig,
    ) -> Self {
        Self {
            backend,
            replica,
            clock,
            config,
        }
    }

    /// Returns whether moving to `target` needs a correction note first.
    ///
    /// Callers use this to open the note-capture step before committing.
    #[must_use]
    pub const fn requires_note(target: TaskStatus) -> bool {
        matches!(target, TaskStatus::Corrections)
    }

    /// Returns the statuses `actor` may pick for the task from `view`.
    ///
    /// An empty list means the control is read-only.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError::NotFound`] when the task is not held.
    pub fn allowed_transitions(
        &self,
        task_id: TaskId,
        actor: &Actor,
        view: TaskView,
    ) -> TaskWorkflowResult<Vec<TaskStatus>> {
        let task = self.current(task_id)?;
        if !view.contains(&task) {
            return Ok(Vec::new());
        }
        Ok(TransitionContext::for_actor(actor, &task, view)
            .allowed_statuses()
            .to_vec())
    }

    /// Validates a request without mutating anything.
    ///
    /// Returns the current task on success.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError::NotFound`] for unknown tasks and
    /// [`TaskWorkflowError::Domain`] when the task is not in the request's
    /// view, the target is outside the allowed set, or a correction note is
    /// missing.
    pub fn validate(
        &self,
        actor: &Actor,
        request: &StatusChangeRequest,
    ) -> TaskWorkflowResult<Task> {
        let task = self.current(request.task_id)?;
        if !request.view.contains(&task) {
            return Err(TaskDomainError::NotInView {
                task_id: task.id(),
                view: request.view,
            }
            .into());
        }
        let context = TransitionContext::for_actor(actor, &task, request.view);
        if !context.permits(request.target) {
            return Err(TaskDomainError::TransitionNotAllowed {
                task_id: task.id(),
                from: task.status(),
                to: request.target,
                view: request.view,
            }
            .into());
        }
        RevisionTracker::validate(&task, request.target, request.correction.as_ref())?;
        Ok(task)
    }

    /// Executes a status change.
    ///
    /// The status, its timestamp and author, and any audit entry are applied
    /// to the replica as one optimistic patch before the backend is called.
    /// The backend write is conditional on the status the actor saw.
    ///
    /// # Errors
    ///
    /// Returns validation errors as [`StatusTransitionEngine::validate`]
    /// does, without calling the backend. Returns
    /// [`TaskWorkflowError::Backend`] after rolling the patch back when
    /// persistence fails or times out.
    pub async fn update_task_status(
        &self,
        actor: &Actor,
        request: StatusChangeRequest,
    ) -> TaskWorkflowResult<Task> {
        let current = self.validate(actor, &request)?;
        let now = self.clock.utc();
        let mut patched = current.clone();
        RevisionTracker::record(
            &mut patched,
            request.target,
            request.correction.as_ref(),
            now,
        )?;
        patched.set_status(request.target, actor.user_id(), now);
        tracing::debug!(
            task_id = %current.id(),
            from = %current.status(),
            to = %request.target,
            "applying status change"
        );

        commit_optimistic(
            &self.replica,
            self.config.persistence_timeout,
            vec![PendingPatch::Upsert(patched.clone())],
            self.backend.update_status(&patched, current.status()),
        )
        .await?;

        tracing::info!(
            task_id = %patched.id(),
            status = %patched.status(),
            user = %actor.user_id(),
            "task status changed"
        );
        Ok(patched)
    }

    /// Sets the posting status of a posting-type task.
    ///
    /// The posting axis is always available and independent of the review
    /// tables.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError::NotFound`] for unknown tasks,
    /// [`TaskDomainError::TaskDeleted`] for binned tasks,
    /// [`TaskDomainError::NotPostingTask`] outside the posting-type set, and
    /// [`TaskWorkflowError::Backend`] after rollback on persistence failure.
    pub async fn update_task_posting_status(
        &self,
        actor: &Actor,
        task_id: TaskId,
        status: PostingStatus,
    ) -> TaskWorkflowResult<Task> {
        let current = self.current(task_id)?;
        if current.is_deleted() {
            return Err(TaskDomainError::TaskDeleted(task_id).into());
        }
        if !current.is_posting_task() {
            return Err(TaskDomainError::NotPostingTask(task_id).into());
        }
        let mut patched = current;
        patched.set_posting_status(status);

        commit_optimistic(
            &self.replica,
            self.config.persistence_timeout,
            vec![PendingPatch::Upsert(patched.clone())],
            self.backend.update_posting_status(task_id, status),
        )
        .await?;

        tracing::info!(
            %task_id,
            posting_status = %status,
            user = %actor.user_id(),
            "posting status changed"
        );
        Ok(patched)
    }

    fn current(&self, task_id: TaskId) -> TaskWorkflowResult<Task> {
        self.replica
            .get(task_id)?
            .ok_or(TaskWorkflowError::NotFound(task_id))
    }
}
