//! Snapshots of optimistic writes awaiting their persistence result.
//!
//! Every optimistic operation records the pre-mutation value of each task it
//! touches. While an operation is pending its local values win: inbound
//! echoes for those tasks are parked and applied once the operation is
//! confirmed or rolled back.

use super::{ReplicaError, TaskStore};
use crate::task::domain::{Task, TaskId};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Identifier of one optimistic operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperationId(Uuid);

impl OperationId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One optimistic change to apply to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingPatch {
    /// Insert or replace a task.
    Upsert(Task),
    /// Remove a task.
    Remove(TaskId),
}

impl PendingPatch {
    /// Returns the task the patch touches.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        match self {
            Self::Upsert(task) => task.id(),
            Self::Remove(id) => *id,
        }
    }
}

#[derive(Debug)]
struct PendingEntry {
    operation: OperationId,
    before: Option<Task>,
    was_selected: bool,
    deferred: Option<Task>,
}

/// Registry of in-flight optimistic operations, keyed by task.
#[derive(Debug, Default)]
pub struct PendingWrites {
    entries: HashMap<TaskId, PendingEntry>,
}

impl PendingWrites {
    /// Returns whether `id` has a pending write.
    #[must_use]
    pub fn is_pending(&self, id: TaskId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Returns the number of tasks with pending writes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshots and applies `patches` as one operation.
    ///
    /// # Errors
    ///
    /// Returns [`ReplicaError::OperationInFlight`] when any touched task
    /// already has a pending write; nothing is applied in that case.
    pub fn begin(
        &mut self,
        store: &mut TaskStore,
        patches: Vec<PendingPatch>,
    ) -> Result<OperationId, ReplicaError> {
        if let Some(busy) = patches
            .iter()
            .map(PendingPatch::task_id)
            .find(|id| self.is_pending(*id))
        {
            return Err(ReplicaError::OperationInFlight(busy));
        }

        let operation = OperationId::new();
        for patch in patches {
            let id = patch.task_id();
            let before = store.get(id).cloned();
            let was_selected = store.selection().contains(id);
            match patch {
                PendingPatch::Upsert(task) => {
                    store.upsert(task);
                }
                PendingPatch::Remove(removed) => {
                    store.remove(removed);
                }
            }
            self.entries.entry(id).or_insert(PendingEntry {
                operation,
                before,
                was_selected,
                deferred: None,
            });
        }
        Ok(operation)
    }

    /// Accepts the optimistic values and applies any parked echoes.
    ///
    /// A parked echo whose status stamp predates the confirmed value is an
    /// echo of an earlier write; it keeps the confirmed status axis and only
    /// contributes its other fields.
    pub fn confirm(&mut self, store: &mut TaskStore, operation: OperationId) {
        for entry in self.take(operation) {
            let Some(mut echo) = entry.deferred else {
                continue;
            };
            let newer = store
                .get(echo.id())
                .filter(|current| echo.status_updated_at() < current.status_updated_at());
            if let Some(current) = newer {
                echo.adopt_status_of(current);
            }
            store.upsert(echo);
        }
    }

    /// Restores the pre-mutation values and selection, then applies any
    /// parked echoes.
    pub fn rollback(&mut self, store: &mut TaskStore, operation: OperationId) {
        for (id, entry) in self.take_with_ids(operation) {
            match entry.before {
                Some(before) => {
                    store.upsert(before);
                }
                None => {
                    store.remove(id);
                }
            }
            if let Some(echo) = entry.deferred {
                store.upsert(echo);
            }
            if entry.was_selected {
                store.select(id);
            }
        }
    }

    /// Drops every pending operation, e.g. when the store is reloaded.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Parks an inbound echo behind a pending write.
    ///
    /// Returns `false` when the task has no pending write.
    pub fn defer(&mut self, echo: Task) -> bool {
        match self.entries.get_mut(&echo.id()) {
            Some(entry) => {
                entry.deferred = Some(echo);
                true
            }
            None => false,
        }
    }

    /// Drops a task from its pending operation after a remote deletion.
    pub fn forget(&mut self, id: TaskId) -> bool {
        self.entries.remove(&id).is_some()
    }

    fn take(&mut self, operation: OperationId) -> Vec<PendingEntry> {
        self.take_with_ids(operation)
            .into_iter()
            .map(|(_, entry)| entry)
            .collect()
    }

    fn take_with_ids(&mut self, operation: OperationId) -> Vec<(TaskId, PendingEntry)> {
        let ids: Vec<TaskId> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.operation == operation)
            .map(|(id, _)| *id)
            .collect();
        ids.into_iter()
            .filter_map(|id| self.entries.remove(&id).map(|entry| (id, entry)))
            .collect()
    }
}
