//! Bulk-operation staging, kept apart from the task records

use std::collections::HashSet;

use crate::cache::TaskCache;
use crate::models::TaskId;

/// Set of task ids the user has ticked for a bulk action.
///
/// Lives with the presentation layer, never on `Task`, so it can't leak
/// into a request body.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    ids: HashSet<TaskId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark or unmark one task. Local only.
    pub fn set_selected(&mut self, id: TaskId, selected: bool) {
        if selected {
            self.ids.insert(id);
        } else {
            self.ids.remove(&id);
        }
    }

    pub fn toggle(&mut self, id: TaskId) {
        if !self.ids.remove(&id) {
            self.ids.insert(id);
        }
    }

    pub fn is_selected(&self, id: &TaskId) -> bool {
        self.ids.contains(id)
    }

    /// Select every task currently in the cache
    pub fn select_all(&mut self, cache: &TaskCache) {
        self.ids.extend(cache.ids().cloned());
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Drop ids that no longer exist after a refetch.
    ///
    /// `SyncController::refetch_selection` does this for you.
    pub fn retain_present(&mut self, cache: &TaskCache) {
        self.ids.retain(|id| cache.contains(id));
    }

    /// Selected ids in cache order
    pub fn ids_in(&self, cache: &TaskCache) -> Vec<TaskId> {
        cache
            .ids()
            .filter(|id| self.ids.contains(*id))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
