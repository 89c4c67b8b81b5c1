//! Merges change-feed events into the session replica.

use crate::task::{
    domain::{Task, TaskId, TaskJoins},
    ports::{ChangeEvent, ChangeEventType, DirectoryError, DirectoryResult, TaskDirectory},
    store::{EchoOutcome, ReplicaError, SessionReplica},
};
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors raised while reconciling one event.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The record could not be decoded as a task row.
    #[error("undecodable change record: {0}")]
    Decode(#[from] serde_json::Error),
    /// Enrichment lookups failed.
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    /// The replica refused the merge.
    #[error(transparent)]
    Replica(#[from] ReplicaError),
}

/// What reconciling one event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The event was merged with the given effect.
    Applied(EchoOutcome),
    /// The event belongs to another table.
    Ignored,
}

#[derive(Deserialize)]
struct RecordKey {
    id: TaskId,
}

/// Attaches directory summaries to a raw task row.
pub(super) async fn enrich<D>(directory: &D, task: Task) -> DirectoryResult<Task>
where
    D: TaskDirectory + ?Sized,
{
    let assignee = match task.assignee_id() {
        Some(id) => directory.profile(id).await?,
        None => None,
    };
    let client = match task.client_id() {
        Some(id) => directory.client(id).await?,
        None => None,
    };
    let project = match task.project_id() {
        Some(id) => directory.project(id).await?,
        None => None,
    };
    Ok(task.with_joins(TaskJoins {
        assignee,
        client,
        project,
    }))
}

/// Consumes change-feed events one at a time and merges them into the
/// replica.
#[derive(Clone)]
pub struct ChangeFeedReconciler<D>
where
    D: TaskDirectory,
{
    replica: SessionReplica,
    directory: Arc<D>,
    table: String,
}

impl<D> ChangeFeedReconciler<D>
where
    D: TaskDirectory,
{
    /// Creates a reconciler for events on `table`.
    #[must_use]
    pub fn new(replica: SessionReplica, directory: Arc<D>, table: impl Into<String>) -> Self {
        Self {
            replica,
            directory,
            table: table.into(),
        }
    }

    /// Attaches directory summaries to a raw task row.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError`] when a lookup fails.
    pub async fn enrich(&self, task: Task) -> Result<Task, DirectoryError> {
        enrich(&*self.directory, task).await
    }

    /// Reconciles one event.
    ///
    /// Inserts and updates are enriched and upserted by id, so an echo of a
    /// local insert never duplicates it and an update for an unknown task
    /// adds it. Deletions remove the task and purge it from the selection.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError`] when the record cannot be decoded, a lookup
    /// fails, or the replica refuses the merge. The replica is unchanged in
    /// the first two cases.
    pub async fn apply(&self, event: ChangeEvent) -> Result<ReconcileOutcome, ReconcileError> {
        if event.table != self.table {
            return Ok(ReconcileOutcome::Ignored);
        }
        let outcome = match event.event_type {
            ChangeEventType::Insert | ChangeEventType::Update => {
                let raw: Task = serde_json::from_value(event.record)?;
                let enriched = self.enrich(raw.without_joins()).await?;
                self.replica.apply_upsert(enriched)?
            }
            ChangeEventType::Delete => {
                let key: RecordKey = serde_json::from_value(event.record)?;
                self.replica.apply_delete(key.id)?
            }
        };
        tracing::debug!(event_type = ?event.event_type, ?outcome, "change event reconciled");
        Ok(ReconcileOutcome::Applied(outcome))
    }

    /// Runs the consumer loop until the feed closes.
    ///
    /// Events are processed strictly one after another. A failing event is
    /// logged and skipped. Returns the number of events merged.
    pub async fn run(&self, mut events: mpsc::UnboundedReceiver<ChangeEvent>) -> usize {
        let mut merged = 0_usize;
        while let Some(event) = events.recv().await {
            match self.apply(event).await {
                Ok(ReconcileOutcome::Applied(_)) => merged = merged.saturating_add(1),
                Ok(ReconcileOutcome::Ignored) => {}
                Err(err) => tracing::warn!(error = %err, "dropping change event"),
            }
        }
        tracing::debug!(merged, "change feed closed");
        merged
    }
}
