//! Dashboard views (tabs) that partition the task set.

use super::{Task, TaskStatus};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A tab of the task dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskView {
    /// Work in flight, including tasks sent back for rework.
    #[default]
    Active,
    /// Tasks awaiting a reviewer.
    UnderReview,
    /// Approved or done tasks.
    Completed,
    /// Soft-deleted tasks.
    Bin,
}

impl TaskView {
    /// Returns the canonical name of the view.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::UnderReview => "under_review",
            Self::Completed => "completed",
            Self::Bin => "bin",
        }
    }

    /// Returns the view a status is listed under, ignoring the bin.
    #[must_use]
    pub const fn for_status(status: TaskStatus) -> Self {
        match status {
            TaskStatus::Todo
            | TaskStatus::InProgress
            | TaskStatus::Corrections
            | TaskStatus::Recreate => Self::Active,
            TaskStatus::Review => Self::UnderReview,
            TaskStatus::Approved | TaskStatus::Done => Self::Completed,
        }
    }

    /// Returns whether `task` is listed in this view.
    ///
    /// Soft-deleted tasks only ever appear in [`TaskView::Bin`].
    #[must_use]
    pub fn contains(self, task: &Task) -> bool {
        match self {
            Self::Bin => task.is_deleted(),
            _ => !task.is_deleted() && Self::for_status(task.status()) == self,
        }
    }
}

impl fmt::Display for TaskView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
