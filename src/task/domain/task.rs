//! Task aggregate root and its directory joins.

use super::{
    ClientId, CorrectionNote, PostingStatus, ProjectId, Revisions, TaskDomainError, TaskId,
    TaskStatus, TaskType, UserId,
};
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Opaque attachment reference held by the blob store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Storage path inside the blob store.
    pub path: String,
    /// Publicly reachable URL.
    #[serde(rename = "publicUrl")]
    pub public_url: String,
    /// Original file name.
    pub name: String,
}

/// Display summary of the assignee's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSummary {
    /// Profile identifier.
    pub id: UserId,
    /// Display name.
    pub full_name: String,
}

/// Display summary of a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSummary {
    /// Client identifier.
    pub id: ClientId,
    /// Client name.
    pub name: String,
}

/// Display summary of a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    /// Project identifier.
    pub id: ProjectId,
    /// Project name.
    pub name: String,
}

/// Directory summaries joined onto a raw task record.
///
/// Joins are never persisted; the change feed delivers raw records and the
/// reconciler fills these in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskJoins {
    /// Assignee profile, if resolvable.
    pub assignee: Option<ProfileSummary>,
    /// Client summary, if resolvable.
    pub client: Option<ClientSummary>,
    /// Project summary, if resolvable.
    pub project: Option<ProjectSummary>,
}

impl TaskJoins {
    /// Returns whether no summary has been resolved.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.assignee.is_none() && self.client.is_none() && self.project.is_none()
    }
}

/// Fields supplied when creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Task description.
    pub description: String,
    /// Task type label.
    pub task_type: Option<TaskType>,
    /// Assignee.
    pub assignee_id: Option<UserId>,
    /// Owning client.
    pub client_id: Option<ClientId>,
    /// Owning project.
    pub project_id: Option<ProjectId>,
    /// Parent for derived tasks.
    pub parent_task_id: Option<TaskId>,
    /// Initial posting status; defaults to `Planned` for posting types.
    pub posting_status: Option<PostingStatus>,
    /// Due date.
    pub deadline: Option<NaiveDate>,
    /// Free-form tags.
    pub tags: Vec<String>,
    /// Attachments.
    pub attachments: Vec<Attachment>,
}

impl NewTask {
    /// Creates a task description with every optional field empty.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            task_type: None,
            assignee_id: None,
            client_id: None,
            project_id: None,
            parent_task_id: None,
            posting_status: None,
            deadline: None,
            tags: Vec::new(),
            attachments: Vec::new(),
        }
    }

    /// Sets the task type.
    #[must_use]
    pub fn with_type(mut self, task_type: TaskType) -> Self {
        self.task_type = Some(task_type);
        self
    }

    /// Sets the assignee.
    #[must_use]
    pub fn with_assignee(mut self, assignee_id: UserId) -> Self {
        self.assignee_id = Some(assignee_id);
        self
    }

    /// Sets client and project.
    #[must_use]
    pub fn with_owner(mut self, client_id: Option<ClientId>, project_id: Option<ProjectId>) -> Self {
        self.client_id = client_id;
        self.project_id = project_id;
        self
    }

    /// Sets the deadline.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: NaiveDate) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Sets tags.
    #[must_use]
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = String>) -> Self {
        self.tags = tags.into_iter().collect();
        self
    }

    /// Sets attachments.
    #[must_use]
    pub fn with_attachments(mut self, attachments: impl IntoIterator<Item = Attachment>) -> Self {
        self.attachments = attachments.into_iter().collect();
        self
    }
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    description: String,
    #[serde(rename = "type", default)]
    task_type: Option<TaskType>,
    status: TaskStatus,
    #[serde(default)]
    posting_status: Option<PostingStatus>,
    #[serde(default)]
    assignee_id: Option<UserId>,
    #[serde(default)]
    client_id: Option<ClientId>,
    #[serde(default)]
    project_id: Option<ProjectId>,
    #[serde(default)]
    parent_task_id: Option<TaskId>,
    #[serde(default)]
    revisions: Revisions,
    #[serde(default)]
    corrections: Vec<CorrectionNote>,
    #[serde(default)]
    deadline: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    #[serde(default)]
    status_updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    status_updated_by: Option<UserId>,
    #[serde(default)]
    is_deleted: bool,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    attachments: Vec<Attachment>,
    #[serde(default, skip_serializing_if = "TaskJoins::is_empty")]
    joins: TaskJoins,
}

/// Parameter object for reconstructing a persisted task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted identifier.
    pub id: TaskId,
    /// Persisted description.
    pub description: String,
    /// Persisted type.
    pub task_type: Option<TaskType>,
    /// Persisted workflow status.
    pub status: TaskStatus,
    /// Persisted posting status.
    pub posting_status: Option<PostingStatus>,
    /// Persisted assignee.
    pub assignee_id: Option<UserId>,
    /// Persisted client.
    pub client_id: Option<ClientId>,
    /// Persisted project.
    pub project_id: Option<ProjectId>,
    /// Persisted parent.
    pub parent_task_id: Option<TaskId>,
    /// Persisted rework counters.
    pub revisions: Revisions,
    /// Persisted correction notes.
    pub corrections: Vec<CorrectionNote>,
    /// Persisted deadline.
    pub deadline: Option<NaiveDate>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted status change timestamp.
    pub status_updated_at: Option<DateTime<Utc>>,
    /// Persisted status change author.
    pub status_updated_by: Option<UserId>,
    /// Persisted bin flag.
    pub is_deleted: bool,
    /// Persisted tags.
    pub tags: Vec<String>,
    /// Persisted attachments.
    pub attachments: Vec<Attachment>,
}

impl Task {
    /// Creates a task in `todo`, outside the bin.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyDescription`] when the description is
    /// blank.
    pub fn new(fields: NewTask, clock: &impl Clock) -> Result<Self, TaskDomainError> {
        let description = fields.description.trim();
        if description.is_empty() {
            return Err(TaskDomainError::EmptyDescription);
        }
        let is_posting = fields
            .task_type
            .as_ref()
            .is_some_and(TaskType::is_posting_type);
        let posting_status = fields
            .posting_status
            .or_else(|| is_posting.then_some(PostingStatus::Planned));

        Ok(Self {
            id: TaskId::new(),
            description: description.to_owned(),
            task_type: fields.task_type,
            status: TaskStatus::Todo,
            posting_status,
            assignee_id: fields.assignee_id,
            client_id: fields.client_id,
            project_id: fields.project_id,
            parent_task_id: fields.parent_task_id,
            revisions: Revisions::default(),
            corrections: Vec::new(),
            deadline: fields.deadline,
            created_at: clock.utc(),
            status_updated_at: None,
            status_updated_by: None,
            is_deleted: false,
            tags: fields.tags,
            attachments: fields.attachments,
            joins: TaskJoins::default(),
        })
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            description: data.description,
            task_type: data.task_type,
            status: data.status,
            posting_status: data.posting_status,
            assignee_id: data.assignee_id,
            client_id: data.client_id,
            project_id: data.project_id,
            parent_task_id: data.parent_task_id,
            revisions: data.revisions,
            corrections: data.corrections,
            deadline: data.deadline,
            created_at: data.created_at,
            status_updated_at: data.status_updated_at,
            status_updated_by: data.status_updated_by,
            is_deleted: data.is_deleted,
            tags: data.tags,
            attachments: data.attachments,
            joins: TaskJoins::default(),
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the task type.
    #[must_use]
    pub const fn task_type(&self) -> Option<&TaskType> {
        self.task_type.as_ref()
    }

    /// Returns whether the task belongs to the posting-type set.
    #[must_use]
    pub fn is_posting_task(&self) -> bool {
        self.task_type
            .as_ref()
            .is_some_and(TaskType::is_posting_type)
    }

    /// Returns the workflow status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the stored posting status.
    ///
    /// Only meaningful when [`Task::is_posting_task`] holds.
    #[must_use]
    pub const fn posting_status(&self) -> Option<PostingStatus> {
        self.posting_status
    }

    /// Returns the assignee.
    #[must_use]
    pub const fn assignee_id(&self) -> Option<&UserId> {
        self.assignee_id.as_ref()
    }

    /// Returns the owning client.
    #[must_use]
    pub const fn client_id(&self) -> Option<&ClientId> {
        self.client_id.as_ref()
    }

    /// Returns the owning project.
    #[must_use]
    pub const fn project_id(&self) -> Option<&ProjectId> {
        self.project_id.as_ref()
    }

    /// Returns the parent of a derived task.
    #[must_use]
    pub const fn parent_task_id(&self) -> Option<TaskId> {
        self.parent_task_id
    }

    /// Returns the rework counters.
    #[must_use]
    pub const fn revisions(&self) -> Revisions {
        self.revisions
    }

    /// Returns correction notes, oldest first.
    #[must_use]
    pub fn corrections(&self) -> &[CorrectionNote] {
        &self.corrections
    }

    /// Returns the deadline.
    #[must_use]
    pub const fn deadline(&self) -> Option<NaiveDate> {
        self.deadline
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the status last changed.
    #[must_use]
    pub const fn status_updated_at(&self) -> Option<DateTime<Utc>> {
        self.status_updated_at
    }

    /// Returns who last changed the status.
    #[must_use]
    pub const fn status_updated_by(&self) -> Option<&UserId> {
        self.status_updated_by.as_ref()
    }

    /// Returns whether the task is in the bin.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    /// Returns tags.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Returns attachments.
    #[must_use]
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Returns joined directory summaries.
    #[must_use]
    pub const fn joins(&self) -> &TaskJoins {
        &self.joins
    }

    /// Returns the task with the given directory summaries attached.
    #[must_use]
    pub fn with_joins(mut self, joins: TaskJoins) -> Self {
        self.joins = joins;
        self
    }

    /// Returns the raw record without directory summaries.
    #[must_use]
    pub fn without_joins(mut self) -> Self {
        self.joins = TaskJoins::default();
        self
    }

    /// Sets the workflow status and stamps who changed it and when.
    pub(crate) fn set_status(&mut self, status: TaskStatus, actor: &UserId, at: DateTime<Utc>) {
        self.status = status;
        self.status_updated_at = Some(at);
        self.status_updated_by = Some(actor.clone());
    }

    /// Copies the status axis of `source`: status, its stamp and the audit
    /// trail. Every other field keeps its current value.
    pub(crate) fn adopt_status_of(&mut self, source: &Self) {
        self.status = source.status;
        self.status_updated_at = source.status_updated_at;
        self.status_updated_by.clone_from(&source.status_updated_by);
        self.revisions = source.revisions;
        self.corrections.clone_from(&source.corrections);
    }

    /// Sets the posting status.
    pub(crate) const fn set_posting_status(&mut self, status: PostingStatus) {
        self.posting_status = Some(status);
    }

    /// Moves the task into or out of the bin.
    pub(crate) const fn set_deleted(&mut self, deleted: bool) {
        self.is_deleted = deleted;
    }

    pub(super) const fn audit_mut(&mut self) -> (&mut Revisions, &mut Vec<CorrectionNote>) {
        (&mut self.revisions, &mut self.corrections)
    }
}
