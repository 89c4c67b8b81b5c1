//! Error types for task domain validation and parsing.

use super::{TaskId, TaskStatus, TaskType, TaskView, UserId};
use thiserror::Error;

/// Validation errors raised before any task mutation takes place.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// A directory reference or label was blank.
    #[error("{0} reference must not be empty")]
    EmptyReference(&'static str),

    /// The task description was blank.
    #[error("task description must not be empty")]
    EmptyDescription,

    /// The requested status is outside the allowed set for this context.
    #[error("task {task_id} cannot move from {from} to {to} in the {view} view")]
    TransitionNotAllowed {
        /// Task identifier.
        task_id: TaskId,
        /// Current status.
        from: TaskStatus,
        /// Requested status.
        to: TaskStatus,
        /// View the request was issued from.
        view: TaskView,
    },

    /// The task is not listed in the view the request was issued from.
    #[error("task {task_id} is not shown in the {view} view")]
    NotInView {
        /// Task identifier.
        task_id: TaskId,
        /// View the request was issued from.
        view: TaskView,
    },

    /// A transition to `corrections` arrived without a note.
    #[error("task {0} needs a correction note before it can be sent back")]
    MissingCorrectionNote(TaskId),

    /// Posting status was set on a task outside the posting-type set.
    #[error("task {0} is not a posting task")]
    NotPostingTask(TaskId),

    /// A posting task was requested from a task that is not complete.
    #[error("task {task_id} is {status}, posting requires done or approved")]
    PostingSourceIncomplete {
        /// Source task identifier.
        task_id: TaskId,
        /// Current status.
        status: TaskStatus,
    },

    /// A posting task was requested from a derived task.
    #[error("task {0} is itself derived and cannot be re-assigned for posting")]
    PostingSourceIsChild(TaskId),

    /// The parent already has an active derived task.
    #[error("task {parent} already has an active derived task {child}")]
    ActiveChildExists {
        /// Parent task identifier.
        parent: TaskId,
        /// Existing child identifier.
        child: TaskId,
    },

    /// The referenced parent task is missing or in the bin.
    #[error("parent task {0} is missing or deleted")]
    ParentUnavailable(TaskId),

    /// The chosen type is not among the assignee's default task types.
    #[error("task type {task_type} is not allowed for assignee {assignee}")]
    TaskTypeNotAllowed {
        /// Chosen type.
        task_type: TaskType,
        /// Assignee the type was checked against.
        assignee: UserId,
    },

    /// The task is in the bin and cannot take this operation.
    #[error("task {0} is in the bin")]
    TaskDeleted(TaskId),

    /// The task is not in the bin and cannot take this operation.
    #[error("task {0} is not in the bin")]
    TaskNotDeleted(TaskId),
}

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing posting statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown posting status: {0}")]
pub struct ParsePostingStatusError(pub String);
