//! Service-level error type shared by the workflow services.

use crate::task::{
    domain::{TaskDomainError, TaskId, UserId},
    ports::{DirectoryError, TaskBackendError},
    store::ReplicaError,
};
use thiserror::Error;

/// Errors returned by workflow operations.
///
/// Validation failures ([`TaskWorkflowError::Domain`],
/// [`TaskWorkflowError::PermissionDenied`], [`TaskWorkflowError::NotFound`],
/// [`TaskWorkflowError::EmptySelection`]) are raised before any mutation or
/// network call. Backend failures are raised after the optimistic patch has
/// been rolled back.
#[derive(Debug, Error)]
pub enum TaskWorkflowError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// The backend rejected or did not complete the write.
    #[error(transparent)]
    Backend(#[from] TaskBackendError),
    /// A directory lookup failed.
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    /// The session replica refused the operation.
    #[error(transparent)]
    Replica(#[from] ReplicaError),
    /// The task is not held by this session.
    #[error("task {0} not found")]
    NotFound(TaskId),
    /// The actor lacks review rights for the action.
    #[error("user {user} lacks review rights to {action}")]
    PermissionDenied {
        /// Acting user.
        user: UserId,
        /// Attempted action.
        action: &'static str,
    },
    /// A bulk operation was invoked without any task.
    #[error("no tasks selected")]
    EmptySelection,
}

impl TaskWorkflowError {
    /// Returns whether the error was raised before any mutation.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Domain(_) | Self::NotFound(_) | Self::PermissionDenied { .. } | Self::EmptySelection
        )
    }
}

/// Result type for workflow operations.
pub type TaskWorkflowResult<T> = Result<T, TaskWorkflowError>;
