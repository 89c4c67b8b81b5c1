//! Port for the hosted data store that owns the canonical task rows.

use crate::task::domain::{PostingStatus, Task, TaskId, TaskStatus};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result type for backend operations.
pub type TaskBackendResult<T> = Result<T, TaskBackendError>;

/// Task persistence contract.
///
/// Every successful write is echoed on the change feed; callers never need
/// to read back what they wrote.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskBackend: Send + Sync {
    /// Inserts a new task row.
    ///
    /// # Errors
    ///
    /// Returns [`TaskBackendError::DuplicateTask`] when the identifier exists
    /// or [`TaskBackendError::ActiveChildExists`] when the task names a parent
    /// that already has an active child.
    async fn insert(&self, task: &Task) -> TaskBackendResult<()>;

    /// Writes the status and audit fields of `task`, provided the stored
    /// status still equals `expected`.
    ///
    /// Only the status, its stamp, the revision counters and the correction
    /// list are written; every other stored field is left as it is.
    ///
    /// # Errors
    ///
    /// Returns [`TaskBackendError::NotFound`] when the row is missing,
    /// [`TaskBackendError::TaskDeleted`] when the row is in the bin, or
    /// [`TaskBackendError::StatusConflict`] when another writer moved the
    /// status first.
    async fn update_status(&self, task: &Task, expected: TaskStatus) -> TaskBackendResult<()>;

    /// Sets the posting status of one row, leaving every other field alone.
    ///
    /// # Errors
    ///
    /// Returns [`TaskBackendError::NotFound`] when the row is missing or
    /// [`TaskBackendError::TaskDeleted`] when the row is in the bin.
    async fn update_posting_status(
        &self,
        id: TaskId,
        status: PostingStatus,
    ) -> TaskBackendResult<()>;

    /// Sets the bin flag on every listed task in one request.
    ///
    /// # Errors
    ///
    /// Returns [`TaskBackendError::NotFound`] when any row is missing.
    async fn set_deleted(&self, ids: &[TaskId], deleted: bool) -> TaskBackendResult<()>;

    /// Removes the listed rows permanently in one request.
    ///
    /// # Errors
    ///
    /// Returns [`TaskBackendError::NotFound`] when any row is missing.
    async fn delete_permanently(&self, ids: &[TaskId]) -> TaskBackendResult<()>;

    /// Returns every stored task, bin included.
    async fn list(&self) -> TaskBackendResult<Vec<Task>>;
}

/// Errors returned by backend implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskBackendError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The parent already has an active child row.
    #[error("task {parent} already has an active child")]
    ActiveChildExists {
        /// Parent identifier.
        parent: TaskId,
    },

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The stored row is in the bin and refuses workflow writes.
    #[error("task {0} is in the bin")]
    TaskDeleted(TaskId),

    /// The stored status no longer matches the expected one.
    #[error("task {task_id} status is {actual}, expected {expected}")]
    StatusConflict {
        /// Task identifier.
        task_id: TaskId,
        /// Status the writer expected.
        expected: TaskStatus,
        /// Status found in storage.
        actual: TaskStatus,
    },

    /// The request did not complete within the configured deadline.
    #[error("backend request timed out after {0:?}")]
    Timeout(Duration),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskBackendError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
