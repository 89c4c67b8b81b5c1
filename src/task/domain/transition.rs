//! Role- and view-scoped status transition tables.
//!
//! Transition legality is a pure function of the view, the actor's review
//! rights and whether the actor is the assignee. The current status only
//! matters through the view the task is listed in.

use super::{Actor, Task, TaskStatus, TaskView};

/// Default set for the active view.
pub const MAIN_STATUS_OPTIONS: [TaskStatus; 3] =
    [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Review];

/// Default set for the under-review view, reviewers only.
pub const REVIEW_STATUS_OPTIONS: [TaskStatus; 4] = [
    TaskStatus::Review,
    TaskStatus::Corrections,
    TaskStatus::Recreate,
    TaskStatus::Approved,
];

/// Under-review set for a reviewer who is also the assignee.
pub const REVIEWER_ASSIGNEE_STATUS_OPTIONS: [TaskStatus; 6] = [
    TaskStatus::Review,
    TaskStatus::Corrections,
    TaskStatus::Recreate,
    TaskStatus::Approved,
    TaskStatus::InProgress,
    TaskStatus::Todo,
];

/// Completed-view set, reviewers only.
pub const COMPLETED_STATUS_OPTIONS: [TaskStatus; 2] = [TaskStatus::Approved, TaskStatus::Review];

/// Inputs that decide which statuses an actor may pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionContext {
    /// View the request is issued from.
    pub view: TaskView,
    /// Whether the actor holds review rights.
    pub is_reviewer: bool,
    /// Whether the actor is the task's assignee.
    pub is_assignee: bool,
}

impl TransitionContext {
    /// Builds the context for `actor` acting on `task` from `view`.
    #[must_use]
    pub fn for_actor(actor: &Actor, task: &Task, view: TaskView) -> Self {
        Self {
            view,
            is_reviewer: actor.is_reviewer(),
            is_assignee: task.assignee_id() == Some(actor.user_id()),
        }
    }

    /// Returns the statuses selectable in this context.
    ///
    /// An empty slice means the status control is read-only.
    #[must_use]
    pub const fn allowed_statuses(self) -> &'static [TaskStatus] {
        match self.view {
            TaskView::Active if self.is_assignee => &MAIN_STATUS_OPTIONS,
            TaskView::UnderReview if self.is_reviewer && self.is_assignee => {
                &REVIEWER_ASSIGNEE_STATUS_OPTIONS
            }
            TaskView::UnderReview if self.is_reviewer => &REVIEW_STATUS_OPTIONS,
            TaskView::Completed if self.is_reviewer => &COMPLETED_STATUS_OPTIONS,
            _ => &[],
        }
    }

    /// Returns whether `target` is selectable in this context.
    #[must_use]
    pub fn permits(self, target: TaskStatus) -> bool {
        self.allowed_statuses().contains(&target)
    }
}
