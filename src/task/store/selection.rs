//! Bulk-selection set scoped to one dashboard view.

use crate::task::domain::{TaskId, TaskView};
use std::collections::BTreeSet;

/// Tasks picked for a bulk operation in the current view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    view: TaskView,
    ids: BTreeSet<TaskId>,
}

impl Selection {
    /// Returns the view the selection is scoped to.
    #[must_use]
    pub const fn view(&self) -> TaskView {
        self.view
    }

    /// Returns the selected identifiers in ascending order.
    #[must_use]
    pub fn ids(&self) -> Vec<TaskId> {
        self.ids.iter().copied().collect()
    }

    /// Returns whether `id` is selected.
    #[must_use]
    pub fn contains(&self, id: TaskId) -> bool {
        self.ids.contains(&id)
    }

    /// Returns the number of selected tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns whether nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub(super) fn switch_view(&mut self, view: TaskView) {
        self.view = view;
        self.ids.clear();
    }

    pub(super) fn insert(&mut self, id: TaskId) -> bool {
        self.ids.insert(id)
    }

    pub(super) fn remove(&mut self, id: TaskId) -> bool {
        self.ids.remove(&id)
    }

    pub(super) fn clear(&mut self) -> bool {
        let had_ids = !self.ids.is_empty();
        self.ids.clear();
        had_ids
    }
}
