//! In-memory client, project and profile directories.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::task::{
    domain::{ClientId, ClientSummary, ProfileSummary, ProjectId, ProjectSummary, TaskType, UserId},
    ports::{DirectoryResult, TaskDirectory},
};

/// Directory lookups backed by fixed maps.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    profiles: HashMap<UserId, ProfileSummary>,
    clients: HashMap<ClientId, ClientSummary>,
    projects: HashMap<ProjectId, ProjectSummary>,
    default_task_types: HashMap<UserId, Vec<TaskType>>,
}

impl InMemoryDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a profile.
    #[must_use]
    pub fn with_profile(mut self, profile: ProfileSummary) -> Self {
        self.profiles.insert(profile.id.clone(), profile);
        self
    }

    /// Adds a client.
    #[must_use]
    pub fn with_client(mut self, client: ClientSummary) -> Self {
        self.clients.insert(client.id.clone(), client);
        self
    }

    /// Adds a project.
    #[must_use]
    pub fn with_project(mut self, project: ProjectSummary) -> Self {
        self.projects.insert(project.id.clone(), project);
        self
    }

    /// Sets the default task types of a user.
    #[must_use]
    pub fn with_default_task_types(
        mut self,
        user: UserId,
        types: impl IntoIterator<Item = TaskType>,
    ) -> Self {
        self.default_task_types
            .insert(user, types.into_iter().collect());
        self
    }
}

#[async_trait]
impl TaskDirectory for InMemoryDirectory {
    async fn profile(&self, id: &UserId) -> DirectoryResult<Option<ProfileSummary>> {
        Ok(self.profiles.get(id).cloned())
    }

    async fn client(&self, id: &ClientId) -> DirectoryResult<Option<ClientSummary>> {
        Ok(self.clients.get(id).cloned())
    }

    async fn project(&self, id: &ProjectId) -> DirectoryResult<Option<ProjectSummary>> {
        Ok(self.projects.get(id).cloned())
    }

    async fn default_task_types(&self, id: &UserId) -> DirectoryResult<Vec<TaskType>> {
        Ok(self.default_task_types.get(id).cloned().unwrap_or_default())
    }
}
