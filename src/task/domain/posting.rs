//! Derivation of child tasks: posting tasks and schedule-driven tasks.

use super::{
    ClientId, NewTask, PostingStatus, ProjectId, ScheduleId, Task, TaskDomainError, TaskId,
    TaskType, UserId,
};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Prefix prepended to the source description of a posting task.
pub const POSTING_DESCRIPTION_PREFIX: &str = "Post: ";

/// Computes the deadline of a derived task from its post date.
///
/// A post due today or tomorrow is due today; anything later is due the day
/// before it goes out. Dates in the past are treated like today.
#[must_use]
pub fn derive_posting_deadline(post_date: NaiveDate, today: NaiveDate) -> NaiveDate {
    let tomorrow = today.checked_add_days(Days::new(1)).unwrap_or(today);
    if post_date <= tomorrow {
        return today;
    }
    post_date.checked_sub_days(Days::new(1)).unwrap_or(today)
}

/// Returns the active (non-deleted) child of `parent`, if any.
pub fn active_child_of<'a>(
    parent: TaskId,
    tasks: impl IntoIterator<Item = &'a Task>,
) -> Option<&'a Task> {
    tasks
        .into_iter()
        .find(|task| !task.is_deleted() && task.parent_task_id() == Some(parent))
}

/// Checks that `parent` can take a new child.
///
/// # Errors
///
/// Returns [`TaskDomainError::ParentUnavailable`] when the parent is in the
/// bin, or [`TaskDomainError::ActiveChildExists`] when an active child
/// already references it.
pub fn ensure_can_adopt<'a>(
    parent: &Task,
    tasks: impl IntoIterator<Item = &'a Task>,
) -> Result<(), TaskDomainError> {
    if parent.is_deleted() {
        return Err(TaskDomainError::ParentUnavailable(parent.id()));
    }
    if let Some(child) = active_child_of(parent.id(), tasks) {
        return Err(TaskDomainError::ActiveChildExists {
            parent: parent.id(),
            child: child.id(),
        });
    }
    Ok(())
}

/// Checks every precondition for re-assigning `source` for posting.
///
/// `tasks` must be the full task set held by the caller, bin included.
///
/// # Errors
///
/// Returns the first failed precondition as a [`TaskDomainError`].
pub fn ensure_can_spawn_posting<'a>(
    source: &Task,
    tasks: impl IntoIterator<Item = &'a Task>,
) -> Result<(), TaskDomainError> {
    if !source.status().is_terminal() {
        return Err(TaskDomainError::PostingSourceIncomplete {
            task_id: source.id(),
            status: source.status(),
        });
    }
    if source.parent_task_id().is_some() {
        return Err(TaskDomainError::PostingSourceIsChild(source.id()));
    }
    ensure_can_adopt(source, tasks)
}

/// Actor choices for a posting task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostingRequest {
    /// Who will post.
    pub assignee_id: UserId,
    /// Type picked from the assignee's default task types.
    pub task_type: TaskType,
    /// Date the post goes out.
    pub post_date: NaiveDate,
}

impl PostingRequest {
    /// Creates a posting request.
    #[must_use]
    pub const fn new(assignee_id: UserId, task_type: TaskType, post_date: NaiveDate) -> Self {
        Self {
            assignee_id,
            task_type,
            post_date,
        }
    }

    /// Builds the fields of the posting task derived from `source`.
    #[must_use]
    pub fn derive_from(&self, source: &Task, today: NaiveDate) -> NewTask {
        NewTask {
            description: format!("{POSTING_DESCRIPTION_PREFIX}{}", source.description()),
            task_type: Some(self.task_type.clone()),
            assignee_id: Some(self.assignee_id.clone()),
            client_id: source.client_id().cloned(),
            project_id: source.project_id().cloned(),
            parent_task_id: Some(source.id()),
            posting_status: Some(PostingStatus::Planned),
            deadline: Some(derive_posting_deadline(self.post_date, today)),
            tags: Vec::new(),
            attachments: source.attachments().to_vec(),
        }
    }
}

/// Schedule entry produced by the scheduling subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Schedule identifier.
    pub id: ScheduleId,
    /// Title used as the task description.
    pub title: String,
    /// Type of the task to create.
    #[serde(rename = "type")]
    pub task_type: TaskType,
    /// Assignee of the task to create.
    pub assignee_id: Option<UserId>,
    /// Owning client.
    pub client_id: Option<ClientId>,
    /// Owning project.
    pub project_id: Option<ProjectId>,
    /// Date the scheduled work goes out.
    pub scheduled_for: NaiveDate,
    /// Task the schedule derives from, if any.
    pub source_task_id: Option<TaskId>,
}

impl Schedule {
    /// Builds the fields of the task triggered by this schedule.
    #[must_use]
    pub fn derive_task(&self, today: NaiveDate) -> NewTask {
        let posting_status = self
            .task_type
            .is_posting_type()
            .then_some(PostingStatus::Planned);
        NewTask {
            description: self.title.clone(),
            task_type: Some(self.task_type.clone()),
            assignee_id: self.assignee_id.clone(),
            client_id: self.client_id.clone(),
            project_id: self.project_id.clone(),
            parent_task_id: self.source_task_id,
            posting_status,
            deadline: Some(derive_posting_deadline(self.scheduled_for, today)),
            tags: Vec::new(),
            attachments: Vec::new(),
        }
    }
}
