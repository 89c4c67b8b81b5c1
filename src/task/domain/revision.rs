//! Audit trail of corrections and recreations.

use super::{Task, TaskDomainError, TaskStatus, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cumulative rework counters. Never decremented, never reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revisions {
    /// Number of times the task was sent back with corrections.
    pub corrections: u32,
    /// Number of times the task was sent back to be recreated.
    pub recreations: u32,
}

/// A reviewer-authored note attached when sending a task back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionNote {
    /// Note text.
    pub note: String,
    /// Reviewer who wrote the note.
    pub author_id: UserId,
    /// When the note was recorded.
    pub created_at: DateTime<Utc>,
}

/// Correction payload supplied alongside a transition to `corrections`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrectionRequest {
    note: String,
    author_id: UserId,
}

impl CorrectionRequest {
    /// Creates a correction payload.
    #[must_use]
    pub fn new(note: impl Into<String>, author_id: UserId) -> Self {
        Self {
            note: note.into(),
            author_id,
        }
    }

    /// Returns the note text.
    #[must_use]
    pub fn note(&self) -> &str {
        &self.note
    }

    /// Returns the note author.
    #[must_use]
    pub const fn author_id(&self) -> &UserId {
        &self.author_id
    }

    fn has_content(&self) -> bool {
        !self.note.trim().is_empty()
    }
}

/// Applies audit-field changes that accompany rework transitions.
///
/// These are the only mutation points for [`Revisions`] and the correction
/// list. Both change inside the same patch as the status so no observer can
/// see one without the other.
#[derive(Debug, Clone, Copy, Default)]
pub struct RevisionTracker;

impl RevisionTracker {
    /// Checks the correction payload required for `target`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::MissingCorrectionNote`] when `target` is
    /// `corrections` and no non-blank note accompanies it.
    pub fn validate(
        task: &Task,
        target: TaskStatus,
        correction: Option<&CorrectionRequest>,
    ) -> Result<(), TaskDomainError> {
        if target == TaskStatus::Corrections && !correction.is_some_and(CorrectionRequest::has_content)
        {
            return Err(TaskDomainError::MissingCorrectionNote(task.id()));
        }
        Ok(())
    }

    /// Records the audit entry for a committed transition to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::MissingCorrectionNote`] under the same
    /// conditions as [`RevisionTracker::validate`]; the task is untouched.
    pub fn record(
        task: &mut Task,
        target: TaskStatus,
        correction: Option<&CorrectionRequest>,
        at: DateTime<Utc>,
    ) -> Result<(), TaskDomainError> {
        Self::validate(task, target, correction)?;
        let (revisions, corrections) = task.audit_mut();
        match (target, correction) {
            (TaskStatus::Corrections, Some(request)) => {
                revisions.corrections = revisions.corrections.saturating_add(1);
                corrections.push(CorrectionNote {
                    note: request.note.trim().to_owned(),
                    author_id: request.author_id.clone(),
                    created_at: at,
                });
            }
            (TaskStatus::Recreate, _) => {
                revisions.recreations = revisions.recreations.saturating_add(1);
            }
            _ => {}
        }
        Ok(())
    }
}
