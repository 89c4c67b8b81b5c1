//! Bin operations over a set of tasks, all-or-nothing.

use super::{TaskWorkflowError, TaskWorkflowResult, optimistic::commit_optimistic};
use crate::config::WorkflowConfig;
use crate::task::{
    domain::{Actor, Task, TaskDomainError, TaskId, TaskView, active_child_of},
    ports::TaskBackend,
    store::{PendingPatch, SessionReplica, TaskStore},
};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

/// Bin operation applied to a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    /// Move tasks into the bin.
    SoftDelete,
    /// Move tasks out of the bin.
    Restore,
    /// Remove binned tasks for good.
    DeletePermanently,
}

impl BulkAction {
    /// Returns a short label for logs and errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SoftDelete => "delete tasks",
            Self::Restore => "restore tasks",
            Self::DeletePermanently => "delete tasks permanently",
        }
    }
}

impl fmt::Display for BulkAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Checks `action` against every task in `ids` and builds its patches.
///
/// # Errors
///
/// Returns [`TaskWorkflowError::EmptySelection`], [`TaskWorkflowError::NotFound`]
/// or the first domain rule the batch would break.
pub fn plan_bulk_action(
    store: &TaskStore,
    action: BulkAction,
    ids: &BTreeSet<TaskId>,
) -> TaskWorkflowResult<Vec<PendingPatch>> {
    if ids.is_empty() {
        return Err(TaskWorkflowError::EmptySelection);
    }
    let tasks = ids
        .iter()
        .map(|id| store.get(*id).ok_or(TaskWorkflowError::NotFound(*id)))
        .collect::<TaskWorkflowResult<Vec<&Task>>>()?;

    match action {
        BulkAction::SoftDelete => {
            for task in &tasks {
                ensure_soft_deletable(store, task, ids)?;
            }
            Ok(flag_patches(&tasks, true))
        }
        BulkAction::Restore => {
            let mut adopted: HashMap<TaskId, TaskId> = HashMap::new();
            for task in &tasks {
                ensure_restorable(store, task, ids, &mut adopted)?;
            }
            Ok(flag_patches(&tasks, false))
        }
        BulkAction::DeletePermanently => tasks
            .iter()
            .map(|task| {
                if task.is_deleted() {
                    Ok(PendingPatch::Remove(task.id()))
                } else {
                    Err(TaskWorkflowError::from(TaskDomainError::TaskNotDeleted(
                        task.id(),
                    )))
                }
            })
            .collect(),
    }
}

fn ensure_soft_deletable(
    store: &TaskStore,
    task: &Task,
    batch: &BTreeSet<TaskId>,
) -> TaskWorkflowResult<()> {
    if task.is_deleted() {
        return Err(TaskDomainError::TaskDeleted(task.id()).into());
    }
    if let Some(child) = active_child_of(task.id(), store.iter()) {
        if !batch.contains(&child.id()) {
            return Err(TaskDomainError::ActiveChildExists {
                parent: task.id(),
                child: child.id(),
            }
            .into());
        }
    }
    Ok(())
}

fn ensure_restorable(
    store: &TaskStore,
    task: &Task,
    batch: &BTreeSet<TaskId>,
    adopted: &mut HashMap<TaskId, TaskId>,
) -> TaskWorkflowResult<()> {
    if !task.is_deleted() {
        return Err(TaskDomainError::TaskNotDeleted(task.id()).into());
    }
    let Some(parent_id) = task.parent_task_id() else {
        return Ok(());
    };
    let parent_available = store
        .get(parent_id)
        .is_some_and(|parent| !parent.is_deleted() || batch.contains(&parent_id));
    if !parent_available {
        return Err(TaskDomainError::ParentUnavailable(parent_id).into());
    }
    let sibling = active_child_of(parent_id, store.iter())
        .map(Task::id)
        .or_else(|| adopted.get(&parent_id).copied());
    if let Some(child) = sibling {
        return Err(TaskDomainError::ActiveChildExists {
            parent: parent_id,
            child,
        }
        .into());
    }
    adopted.insert(parent_id, task.id());
    Ok(())
}

fn flag_patches(tasks: &[&Task], deleted: bool) -> Vec<PendingPatch> {
    tasks
        .iter()
        .map(|task| {
            let mut patched = (*task).clone();
            patched.set_deleted(deleted);
            PendingPatch::Upsert(patched)
        })
        .collect()
}

/// Applies bin operations across a selection with full rollback on failure.
#[derive(Clone)]
pub struct BulkOperationCoordinator<B>
where
    B: TaskBackend,
{
    backend: Arc<B>,
    replica: SessionReplica,
    config: WorkflowConfig,
}

impl<B> BulkOperationCoordinator<B>
where
    B: TaskBackend,
{
    /// Creates a coordinator operating on `replica`.
    #[must_use]
    pub const fn new(backend: Arc<B>, replica: SessionReplica, config: WorkflowConfig) -> Self {
        Self {
            backend,
            replica,
            config,
        }
    }

    /// Switches the dashboard tab, clearing the selection.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError::Replica`] when the replica is poisoned.
    pub fn switch_view(&self, view: TaskView) -> TaskWorkflowResult<()> {
        Ok(self.replica.write(|store| store.switch_view(view))?)
    }

    /// Adds a task of the current view to the selection.
    ///
    /// Returns `false` when the task is not listed in the current view.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError::Replica`] when the replica is poisoned.
    pub fn select(&self, id: TaskId) -> TaskWorkflowResult<bool> {
        Ok(self.replica.write(|store| store.select(id))?)
    }

    /// Removes a task from the selection.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError::Replica`] when the replica is poisoned.
    pub fn deselect(&self, id: TaskId) -> TaskWorkflowResult<()> {
        Ok(self.replica.write(|store| store.deselect(id))?)
    }

    /// Selects every task of the current view. Binned tasks are only
    /// selected from the bin view.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError::Replica`] when the replica is poisoned.
    pub fn select_all_in_view(&self) -> TaskWorkflowResult<()> {
        Ok(self.replica.write(TaskStore::select_all_in_view)?)
    }

    /// Clears the selection, e.g. after a filter change.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError::Replica`] when the replica is poisoned.
    pub fn clear_selection(&self) -> TaskWorkflowResult<()> {
        Ok(self.replica.write(TaskStore::clear_selection)?)
    }

    /// Returns the selected task identifiers.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError::Replica`] when the replica is poisoned.
    pub fn selected_ids(&self) -> TaskWorkflowResult<Vec<TaskId>> {
        Ok(self.replica.read(|store| store.selection().ids())?)
    }

    /// Runs `action` on the current selection.
    ///
    /// # Errors
    ///
    /// See [`BulkOperationCoordinator::execute`].
    pub async fn execute_on_selection(
        &self,
        actor: &Actor,
        action: BulkAction,
    ) -> TaskWorkflowResult<usize> {
        let ids = self.selected_ids()?;
        self.execute(actor, action, &ids).await
    }

    /// Runs `action` on `ids` as one all-or-nothing operation.
    ///
    /// Every task is patched before the single backend request; any failure
    /// restores every task. On success the selection is cleared. Returns the
    /// number of tasks affected.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError::PermissionDenied`] for non-reviewers,
    /// validation errors from [`plan_bulk_action`] before any mutation, and
    /// [`TaskWorkflowError::Backend`] after full rollback.
    pub async fn execute(
        &self,
        actor: &Actor,
        action: BulkAction,
        ids: &[TaskId],
    ) -> TaskWorkflowResult<usize> {
        if !actor.is_reviewer() {
            return Err(TaskWorkflowError::PermissionDenied {
                user: actor.user_id().clone(),
                action: action.as_str(),
            });
        }
        let batch: BTreeSet<TaskId> = ids.iter().copied().collect();
        let patches = self
            .replica
            .read(|store| plan_bulk_action(store, action, &batch))??;
        let targets: Vec<TaskId> = batch.into_iter().collect();

        let request = match action {
            BulkAction::SoftDelete => self.backend.set_deleted(&targets, true),
            BulkAction::Restore => self.backend.set_deleted(&targets, false),
            BulkAction::DeletePermanently => self.backend.delete_permanently(&targets),
        };
        commit_optimistic(
            &self.replica,
            self.config.persistence_timeout,
            patches,
            request,
        )
        .await?;

        self.replica.write(TaskStore::clear_selection)?;
        tracing::info!(%action, count = targets.len(), user = %actor.user_id(), "bulk operation applied");
        Ok(targets.len())
    }
}
