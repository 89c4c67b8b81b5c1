//! Domain model for the task review workflow.
//!
//! The domain covers the task aggregate, its two status axes, role- and
//! view-scoped transition tables, the rework audit trail, and the derivation
//! rules for child tasks. Nothing here performs I/O.

mod error;
mod ids;
mod permission;
mod posting;
mod revision;
mod status;
mod task;
mod transition;
mod view;

pub use error::{ParsePostingStatusError, ParseTaskStatusError, TaskDomainError};
pub use ids::{ClientId, ProjectId, ScheduleId, TaskId, TaskType, UserId};
pub use permission::{Actor, PermissionLevel};
pub use posting::{
    POSTING_DESCRIPTION_PREFIX, PostingRequest, Schedule, active_child_of,
    derive_posting_deadline, ensure_can_adopt, ensure_can_spawn_posting,
};
pub use revision::{CorrectionNote, CorrectionRequest, RevisionTracker, Revisions};
pub use status::{PostingStatus, TaskStatus};
pub use task::{
    Attachment, ClientSummary, NewTask, PersistedTaskData, ProfileSummary, ProjectSummary, Task,
    TaskJoins,
};
pub use transition::{
    COMPLETED_STATUS_OPTIONS, MAIN_STATUS_OPTIONS, REVIEW_STATUS_OPTIONS,
    REVIEWER_ASSIGNEE_STATUS_OPTIONS, TransitionContext,
};
pub use view::TaskView;
