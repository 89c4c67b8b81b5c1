//! Port for the read-only client, project and profile directories.

use crate::task::domain::{
    ClientId, ClientSummary, ProfileSummary, ProjectId, ProjectSummary, TaskType, UserId,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for directory lookups.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Read-only lookups into directories the workflow does not own.
#[async_trait]
pub trait TaskDirectory: Send + Sync {
    /// Finds a profile summary. `None` when the profile is unknown.
    async fn profile(&self, id: &UserId) -> DirectoryResult<Option<ProfileSummary>>;

    /// Finds a client summary. `None` when the client is unknown.
    async fn client(&self, id: &ClientId) -> DirectoryResult<Option<ClientSummary>>;

    /// Finds a project summary. `None` when the project is unknown.
    async fn project(&self, id: &ProjectId) -> DirectoryResult<Option<ProjectSummary>>;

    /// Returns the task types the user may be assigned by default.
    async fn default_task_types(&self, id: &UserId) -> DirectoryResult<Vec<TaskType>>;
}

/// Errors returned by directory implementations.
#[derive(Debug, Clone, Error)]
#[error("directory lookup failed: {0}")]
pub struct DirectoryError(pub Arc<dyn std::error::Error + Send + Sync>);

impl DirectoryError {
    /// Wraps a lookup failure.
    pub fn lookup(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Arc::new(err))
    }
}
