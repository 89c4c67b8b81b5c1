//! Optimistic apply-then-persist helper shared by the mutating services.

use super::TaskWorkflowResult;
use crate::task::{
    ports::{TaskBackendError, TaskBackendResult},
    store::{PendingPatch, SessionReplica},
};
use std::future::Future;
use std::time::Duration;

/// Applies `patches` to the replica, awaits `request`, then confirms on
/// success or restores the pre-mutation snapshot on failure or timeout.
///
/// `request` is not polled before the patches are applied.
pub(super) async fn commit_optimistic<T>(
    replica: &SessionReplica,
    timeout: Duration,
    patches: Vec<PendingPatch>,
    request: impl Future<Output = TaskBackendResult<T>>,
) -> TaskWorkflowResult<T> {
    let operation = replica.begin(patches)?;
    let outcome = tokio::time::timeout(timeout, request)
        .await
        .unwrap_or_else(|_| Err(TaskBackendError::Timeout(timeout)));
    match outcome {
        Ok(value) => {
            replica.confirm(operation)?;
            Ok(value)
        }
        Err(err) => {
            tracing::warn!(%operation, error = %err, "persistence failed, rolling back");
            replica.rollback(operation)?;
            Err(err.into())
        }
    }
}
