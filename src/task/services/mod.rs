//! Application services for the task review workflow.

mod bulk;
mod error;
mod lifecycle;
mod optimistic;
mod posting;
mod reconciler;
mod transition;

pub use bulk::{BulkAction, BulkOperationCoordinator, plan_bulk_action};
pub use error::{TaskWorkflowError, TaskWorkflowResult};
pub use lifecycle::TaskLifecycleService;
pub use posting::PostingSpawner;
pub use reconciler::{ChangeFeedReconciler, ReconcileError, ReconcileOutcome};
pub use transition::{StatusChangeRequest, StatusTransitionEngine};
