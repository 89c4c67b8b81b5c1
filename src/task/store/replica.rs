//! Per-session replica of task entities.

use super::Selection;
use crate::task::domain::{Task, TaskId, TaskView};
use std::collections::HashMap;
use tokio::sync::broadcast;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Change notification emitted to store observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    /// A task was inserted or replaced.
    Upserted(TaskId),
    /// A task was removed.
    Removed(TaskId),
    /// The selection set or its view changed.
    SelectionChanged,
}

/// Authoritative in-process replica of tasks for one client session.
///
/// The store is a plain container: it never validates workflow rules and
/// never rolls anything back on its own.
#[derive(Debug)]
pub struct TaskStore {
    tasks: HashMap<TaskId, Task>,
    selection: Selection,
    events: broadcast::Sender<StoreEvent>,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            tasks: HashMap::new(),
            selection: Selection::default(),
            events,
        }
    }

    /// Subscribes to change notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Returns a task by identifier.
    #[must_use]
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(&id)
    }

    /// Returns the number of tasks held, bin included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns whether the store holds no task.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Iterates over every task, bin included, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    /// Returns the tasks listed in `view`, newest first.
    #[must_use]
    pub fn tasks_in_view(&self, view: TaskView) -> Vec<&Task> {
        let mut listed: Vec<&Task> = self.tasks.values().filter(|task| view.contains(task)).collect();
        listed.sort_by(|left, right| {
            right
                .created_at()
                .cmp(&left.created_at())
                .then_with(|| left.id().cmp(&right.id()))
        });
        listed
    }

    /// Inserts or replaces a task, returning the previous value.
    ///
    /// A selected task that no longer belongs to the selection's view is
    /// deselected.
    pub fn upsert(&mut self, task: Task) -> Option<Task> {
        let id = task.id();
        let left_view = !self.selection.view().contains(&task);
        let previous = self.tasks.insert(id, task);
        if left_view && self.selection.remove(id) {
            self.notify(StoreEvent::SelectionChanged);
        }
        self.notify(StoreEvent::Upserted(id));
        previous
    }

    /// Removes a task and purges it from the selection.
    pub fn remove(&mut self, id: TaskId) -> Option<Task> {
        let removed = self.tasks.remove(&id);
        if self.selection.remove(id) {
            self.notify(StoreEvent::SelectionChanged);
        }
        if removed.is_some() {
            self.notify(StoreEvent::Removed(id));
        }
        removed
    }

    /// Replaces the whole contents, e.g. after an initial load.
    pub fn replace_all(&mut self, tasks: impl IntoIterator<Item = Task>) {
        let removed: Vec<TaskId> = self.tasks.keys().copied().collect();
        self.tasks.clear();
        for id in removed {
            self.notify(StoreEvent::Removed(id));
        }
        for task in tasks {
            self.upsert(task);
        }
        if self.selection.clear() {
            self.notify(StoreEvent::SelectionChanged);
        }
    }

    /// Returns the current selection.
    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Switches the active view, clearing the selection.
    pub fn switch_view(&mut self, view: TaskView) {
        self.selection.switch_view(view);
        self.notify(StoreEvent::SelectionChanged);
    }

    /// Selects a task listed in the current view.
    ///
    /// Returns `false` when the task is not listed there.
    pub fn select(&mut self, id: TaskId) -> bool {
        let view = self.selection.view();
        let listed = self.tasks.get(&id).is_some_and(|task| view.contains(task));
        if listed && self.selection.insert(id) {
            self.notify(StoreEvent::SelectionChanged);
        }
        listed
    }

    /// Removes a task from the selection.
    pub fn deselect(&mut self, id: TaskId) {
        if self.selection.remove(id) {
            self.notify(StoreEvent::SelectionChanged);
        }
    }

    /// Selects every task listed in the current view.
    pub fn select_all_in_view(&mut self) {
        let view = self.selection.view();
        let listed: Vec<TaskId> = self
            .tasks
            .values()
            .filter(|task| view.contains(task))
            .map(Task::id)
            .collect();
        for id in listed {
            self.selection.insert(id);
        }
        self.notify(StoreEvent::SelectionChanged);
    }

    /// Clears the selection, e.g. when filters change.
    pub fn clear_selection(&mut self) {
        if self.selection.clear() {
            self.notify(StoreEvent::SelectionChanged);
        }
    }

    fn notify(&self, event: StoreEvent) {
        // Sending fails only when nobody listens.
        self.events.send(event).ok();
    }
}
