//! Shared handle over a session's store and its pending writes.

use super::{OperationId, PendingPatch, PendingWrites, StoreEvent, TaskStore};
use crate::task::domain::{Task, TaskId};
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tokio::sync::broadcast;

/// Errors raised by the session replica.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReplicaError {
    /// A writer panicked while holding the replica lock.
    #[error("session replica lock poisoned")]
    Poisoned,

    /// The task already has an optimistic write awaiting persistence.
    #[error("task {0} already has a write in flight")]
    OperationInFlight(TaskId),
}

/// Result of merging one change-feed echo into the replica.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EchoOutcome {
    /// The task was not held before and has been added.
    Inserted,
    /// The held task has been replaced.
    Replaced,
    /// The task has a pending local write; the echo is parked.
    Deferred,
    /// The task has been removed.
    Removed,
    /// A deletion arrived for a task that was not held.
    Absent,
}

#[derive(Debug, Default)]
struct ReplicaState {
    store: TaskStore,
    pending: PendingWrites,
}

/// One session's replica: the task store plus its pending optimistic writes.
///
/// Cloning yields another handle to the same replica. The lock is never held
/// across an await point.
#[derive(Debug, Clone, Default)]
pub struct SessionReplica {
    state: Arc<RwLock<ReplicaState>>,
}

impl SessionReplica {
    /// Creates an empty replica.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `read` against the store.
    ///
    /// # Errors
    ///
    /// Returns [`ReplicaError::Poisoned`] when the lock is poisoned.
    pub fn read<T>(&self, read: impl FnOnce(&TaskStore) -> T) -> Result<T, ReplicaError> {
        let state = self.state.read().map_err(|_| ReplicaError::Poisoned)?;
        Ok(read(&state.store))
    }

    /// Runs `write` against the store, bypassing pending-write bookkeeping.
    ///
    /// Meant for selection changes and test setup.
    ///
    /// # Errors
    ///
    /// Returns [`ReplicaError::Poisoned`] when the lock is poisoned.
    pub fn write<T>(&self, write: impl FnOnce(&mut TaskStore) -> T) -> Result<T, ReplicaError> {
        let mut state = self.state.write().map_err(|_| ReplicaError::Poisoned)?;
        Ok(write(&mut state.store))
    }

    /// Replaces the store with freshly loaded rows and drops every pending
    /// operation; outstanding confirms and rollbacks become no-ops.
    ///
    /// # Errors
    ///
    /// Returns [`ReplicaError::Poisoned`] when the lock is poisoned.
    pub fn reload(&self, tasks: Vec<Task>) -> Result<(), ReplicaError> {
        let mut guard = self.state.write().map_err(|_| ReplicaError::Poisoned)?;
        let state = &mut *guard;
        state.pending.clear();
        state.store.replace_all(tasks);
        Ok(())
    }

    /// Returns a clone of a held task.
    ///
    /// # Errors
    ///
    /// Returns [`ReplicaError::Poisoned`] when the lock is poisoned.
    pub fn get(&self, id: TaskId) -> Result<Option<Task>, ReplicaError> {
        self.read(|store| store.get(id).cloned())
    }

    /// Subscribes to store change notifications.
    ///
    /// # Errors
    ///
    /// Returns [`ReplicaError::Poisoned`] when the lock is poisoned.
    pub fn subscribe(&self) -> Result<broadcast::Receiver<StoreEvent>, ReplicaError> {
        self.read(TaskStore::subscribe)
    }

    /// Returns whether `id` has a pending write.
    ///
    /// # Errors
    ///
    /// Returns [`ReplicaError::Poisoned`] when the lock is poisoned.
    pub fn is_pending(&self, id: TaskId) -> Result<bool, ReplicaError> {
        let state = self.state.read().map_err(|_| ReplicaError::Poisoned)?;
        Ok(state.pending.is_pending(id))
    }

    /// Applies `patches` optimistically as one operation.
    ///
    /// # Errors
    ///
    /// Returns [`ReplicaError::OperationInFlight`] when a touched task already
    /// has a pending write, or [`ReplicaError::Poisoned`].
    pub fn begin(&self, patches: Vec<PendingPatch>) -> Result<OperationId, ReplicaError> {
        let mut guard = self.state.write().map_err(|_| ReplicaError::Poisoned)?;
        let state = &mut *guard;
        state.pending.begin(&mut state.store, patches)
    }

    /// Confirms a pending operation after the backend accepted it.
    ///
    /// # Errors
    ///
    /// Returns [`ReplicaError::Poisoned`] when the lock is poisoned.
    pub fn confirm(&self, operation: OperationId) -> Result<(), ReplicaError> {
        let mut guard = self.state.write().map_err(|_| ReplicaError::Poisoned)?;
        let state = &mut *guard;
        state.pending.confirm(&mut state.store, operation);
        Ok(())
    }

    /// Reverts a pending operation after the backend rejected it.
    ///
    /// # Errors
    ///
    /// Returns [`ReplicaError::Poisoned`] when the lock is poisoned.
    pub fn rollback(&self, operation: OperationId) -> Result<(), ReplicaError> {
        let mut guard = self.state.write().map_err(|_| ReplicaError::Poisoned)?;
        let state = &mut *guard;
        state.pending.rollback(&mut state.store, operation);
        Ok(())
    }

    /// Merges an inserted or updated row.
    ///
    /// # Errors
    ///
    /// Returns [`ReplicaError::Poisoned`] when the lock is poisoned.
    pub fn apply_upsert(&self, task: Task) -> Result<EchoOutcome, ReplicaError> {
        let mut guard = self.state.write().map_err(|_| ReplicaError::Poisoned)?;
        let state = &mut *guard;
        if state.pending.is_pending(task.id()) {
            state.pending.defer(task);
            return Ok(EchoOutcome::Deferred);
        }
        Ok(match state.store.upsert(task) {
            Some(_) => EchoOutcome::Replaced,
            None => EchoOutcome::Inserted,
        })
    }

    /// Merges a removed row. Deletions are applied even over pending writes.
    ///
    /// # Errors
    ///
    /// Returns [`ReplicaError::Poisoned`] when the lock is poisoned.
    pub fn apply_delete(&self, id: TaskId) -> Result<EchoOutcome, ReplicaError> {
        let mut guard = self.state.write().map_err(|_| ReplicaError::Poisoned)?;
        let state = &mut *guard;
        state.pending.forget(id);
        Ok(match state.store.remove(id) {
            Some(_) => EchoOutcome::Removed,
            None => EchoOutcome::Absent,
        })
    }
}
