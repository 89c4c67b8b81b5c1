//! In-memory stand-in for the hosted data store.
//!
//! Every successful write is pushed to subscribers as a [`ChangeEvent`],
//! mirroring the realtime channel of the hosted store. Failures and latency
//! can be injected to exercise rollback paths.

use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::io;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::task::{
    domain::{PostingStatus, Task, TaskId, TaskStatus},
    ports::{ChangeEvent, ChangeEventType, TaskBackend, TaskBackendError, TaskBackendResult},
};

const DEFAULT_TABLE: &str = "tasks";

/// Thread-safe in-memory task backend with a change feed.
#[derive(Debug, Clone)]
pub struct InMemoryTaskBackend {
    table: Arc<str>,
    state: Arc<RwLock<BackendState>>,
}

#[derive(Debug, Default)]
struct BackendState {
    tasks: HashMap<TaskId, Task>,
    subscribers: Vec<mpsc::UnboundedSender<ChangeEvent>>,
    failing_writes: usize,
    latency: Option<Duration>,
}

impl Default for InMemoryTaskBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn lock_error(err: impl ToString) -> TaskBackendError {
    TaskBackendError::persistence(io::Error::other(err.to_string()))
}

impl InMemoryTaskBackend {
    /// Creates an empty backend publishing on the `tasks` table.
    #[must_use]
    pub fn new() -> Self {
        Self::with_table(DEFAULT_TABLE)
    }

    /// Creates an empty backend publishing on `table`.
    #[must_use]
    pub fn with_table(table: &str) -> Self {
        Self {
            table: Arc::from(table),
            state: Arc::new(RwLock::new(BackendState::default())),
        }
    }

    /// Opens a change-feed subscription.
    ///
    /// # Errors
    ///
    /// Returns [`TaskBackendError::Persistence`] when the lock is poisoned.
    pub fn subscribe(&self) -> TaskBackendResult<mpsc::UnboundedReceiver<ChangeEvent>> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut state = self.state.write().map_err(lock_error)?;
        state.subscribers.push(sender);
        Ok(receiver)
    }

    /// Makes the next `count` write requests fail without side effects.
    ///
    /// # Errors
    ///
    /// Returns [`TaskBackendError::Persistence`] when the lock is poisoned.
    pub fn fail_next_writes(&self, count: usize) -> TaskBackendResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.failing_writes = count;
        Ok(())
    }

    /// Delays every write request by `latency`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskBackendError::Persistence`] when the lock is poisoned.
    pub fn set_latency(&self, latency: Duration) -> TaskBackendResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.latency = Some(latency);
        Ok(())
    }

    /// Seeds a row without publishing a change event.
    ///
    /// # Errors
    ///
    /// Returns [`TaskBackendError::DuplicateTask`] when the identifier exists.
    pub fn seed(&self, task: Task) -> TaskBackendResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskBackendError::DuplicateTask(task.id()));
        }
        state.tasks.insert(task.id(), task.without_joins());
        Ok(())
    }

    /// Returns a stored row.
    ///
    /// # Errors
    ///
    /// Returns [`TaskBackendError::Persistence`] when the lock is poisoned.
    pub fn stored(&self, id: TaskId) -> TaskBackendResult<Option<Task>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn simulate_latency(&self) -> TaskBackendResult<()> {
        let latency = self.state.read().map_err(lock_error)?.latency;
        if let Some(delay) = latency {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }

    /// Runs one write under the lock and publishes the resulting events.
    async fn write<F>(&self, apply: F) -> TaskBackendResult<()>
    where
        F: FnOnce(&mut HashMap<TaskId, Task>) -> TaskBackendResult<Vec<(ChangeEventType, serde_json::Value)>>
            + Send,
    {
        self.simulate_latency().await?;
        let mut state = self.state.write().map_err(lock_error)?;
        if state.failing_writes > 0 {
            state.failing_writes -= 1;
            return Err(TaskBackendError::persistence(io::Error::other(
                "injected backend failure",
            )));
        }
        let changes = apply(&mut state.tasks)?;
        let table = self.table.to_string();
        state.subscribers.retain(|subscriber| {
            changes.iter().all(|(event_type, record)| {
                subscriber
                    .send(ChangeEvent::new(*event_type, table.clone(), record.clone()))
                    .is_ok()
            })
        });
        Ok(())
    }
}

fn encode(task: &Task) -> TaskBackendResult<serde_json::Value> {
    serde_json::to_value(task).map_err(TaskBackendError::persistence)
}

/// Returns a stored row that is not in the bin.
fn live_row(tasks: &mut HashMap<TaskId, Task>, id: TaskId) -> TaskBackendResult<&mut Task> {
    let stored = tasks.get_mut(&id).ok_or(TaskBackendError::NotFound(id))?;
    if stored.is_deleted() {
        return Err(TaskBackendError::TaskDeleted(id));
    }
    Ok(stored)
}

fn ensure_all_exist(tasks: &HashMap<TaskId, Task>, ids: &[TaskId]) -> TaskBackendResult<()> {
    match ids.iter().find(|id| !tasks.contains_key(id)) {
        Some(missing) => Err(TaskBackendError::NotFound(*missing)),
        None => Ok(()),
    }
}

#[async_trait]
impl TaskBackend for InMemoryTaskBackend {
    async fn insert(&self, task: &Task) -> TaskBackendResult<()> {
        let row = task.clone().without_joins();
        self.write(move |tasks| {
            if tasks.contains_key(&row.id()) {
                return Err(TaskBackendError::DuplicateTask(row.id()));
            }
            if let Some(parent) = row.parent_task_id() {
                let has_active_child = tasks
                    .values()
                    .any(|other| !other.is_deleted() && other.parent_task_id() == Some(parent));
                if has_active_child {
                    return Err(TaskBackendError::ActiveChildExists { parent });
                }
            }
            let record = encode(&row)?;
            tasks.insert(row.id(), row);
            Ok(vec![(ChangeEventType::Insert, record)])
        })
        .await
    }

    async fn update_status(&self, task: &Task, expected: TaskStatus) -> TaskBackendResult<()> {
        let row = task.clone().without_joins();
        self.write(move |tasks| {
            let stored = live_row(tasks, row.id())?;
            if stored.status() != expected {
                return Err(TaskBackendError::StatusConflict {
                    task_id: row.id(),
                    expected,
                    actual: stored.status(),
                });
            }
            stored.adopt_status_of(&row);
            Ok(vec![(ChangeEventType::Update, encode(stored)?)])
        })
        .await
    }

    async fn update_posting_status(
        &self,
        id: TaskId,
        status: PostingStatus,
    ) -> TaskBackendResult<()> {
        self.write(move |tasks| {
            let stored = live_row(tasks, id)?;
            stored.set_posting_status(status);
            Ok(vec![(ChangeEventType::Update, encode(stored)?)])
        })
        .await
    }

    async fn set_deleted(&self, ids: &[TaskId], deleted: bool) -> TaskBackendResult<()> {
        let targets = ids.to_vec();
        self.write(move |tasks| {
            ensure_all_exist(tasks, &targets)?;
            let mut changes = Vec::with_capacity(targets.len());
            for id in targets {
                if let Some(row) = tasks.get_mut(&id) {
                    row.set_deleted(deleted);
                    changes.push((ChangeEventType::Update, encode(row)?));
                }
            }
            Ok(changes)
        })
        .await
    }

    async fn delete_permanently(&self, ids: &[TaskId]) -> TaskBackendResult<()> {
        let targets = ids.to_vec();
        self.write(move |tasks| {
            ensure_all_exist(tasks, &targets)?;
            let mut changes = Vec::with_capacity(targets.len());
            for id in targets {
                tasks.remove(&id);
                changes.push((ChangeEventType::Delete, json!({ "id": id })));
            }
            Ok(changes)
        })
        .await
    }

    async fn list(&self) -> TaskBackendResult<Vec<Task>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.tasks.values().cloned().collect())
    }
}
