//! Workflow status axes of a task.

use super::{ParsePostingStatusError, ParseTaskStatusError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Primary workflow status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Created, work not started.
    Todo,
    /// The assignee is working on the task.
    InProgress,
    /// Submitted and awaiting a reviewer.
    Review,
    /// Sent back with a correction note.
    Corrections,
    /// Sent back to be recreated from scratch.
    Recreate,
    /// Accepted by a reviewer.
    Approved,
    /// Finished.
    Done,
}

impl TaskStatus {
    /// Every status, in board order.
    pub const ALL: [Self; 7] = [
        Self::Todo,
        Self::InProgress,
        Self::Review,
        Self::Corrections,
        Self::Recreate,
        Self::Approved,
        Self::Done,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "inprogress",
            Self::Review => "review",
            Self::Corrections => "corrections",
            Self::Recreate => "recreate",
            Self::Approved => "approved",
            Self::Done => "done",
        }
    }

    /// Returns whether the status ends the workflow.
    ///
    /// `approved` is terminal for workflow purposes even though reviewers can
    /// still reopen it from the completed view.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Done)
    }

    /// Returns whether the task is back with its assignee for rework.
    #[must_use]
    pub const fn is_rework(self) -> bool {
        matches!(self, Self::Corrections | Self::Recreate)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "todo" => Ok(Self::Todo),
            "inprogress" => Ok(Self::InProgress),
            "review" => Ok(Self::Review),
            "corrections" => Ok(Self::Corrections),
            "recreate" => Ok(Self::Recreate),
            "approved" => Ok(Self::Approved),
            "done" => Ok(Self::Done),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

/// Publishing progress of a posting-type task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PostingStatus {
    /// Post is planned.
    Planned,
    /// Post is scheduled on the target platform.
    Scheduled,
    /// Post is live.
    Posted,
}

impl PostingStatus {
    /// The linear posting sequence, always available for posting tasks.
    pub const ALL: [Self; 3] = [Self::Planned, Self::Scheduled, Self::Posted];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Planned => "Planned",
            Self::Scheduled => "Scheduled",
            Self::Posted => "Posted",
        }
    }
}

impl fmt::Display for PostingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for PostingStatus {
    type Error = ParsePostingStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "planned" => Ok(Self::Planned),
            "scheduled" => Ok(Self::Scheduled),
            "posted" => Ok(Self::Posted),
            _ => Err(ParsePostingStatusError(value.to_owned())),
        }
    }
}
