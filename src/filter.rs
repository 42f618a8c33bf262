//! Filter state for the task list query

use crate::models::{Category, DueFilter, Priority};

/// Currently selected query constraints. All `None` means unfiltered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub search: Option<String>,
    pub priority: Option<Priority>,
    pub category: Option<Category>,
    pub is_done: Option<bool>,
    pub due: Option<DueFilter>,
}

/// A partial filter update.
///
/// Only keys that were set are merged; setting a key to `None` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPatch {
    search: Option<Option<String>>,
    priority: Option<Option<Priority>>,
    category: Option<Option<Category>>,
    is_done: Option<Option<bool>>,
    due: Option<Option<DueFilter>>,
}

impl FilterPatch {
    pub fn search(mut self, search: Option<impl Into<String>>) -> Self {
        self.search = Some(search.map(Into::into));
        self
    }

    pub fn priority(mut self, priority: Option<Priority>) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn category(mut self, category: Option<Category>) -> Self {
        self.category = Some(category);
        self
    }

    pub fn is_done(mut self, is_done: Option<bool>) -> Self {
        self.is_done = Some(is_done);
        self
    }

    pub fn due(mut self, due: Option<DueFilter>) -> Self {
        self.due = Some(due);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl TaskFilter {
    /// Merge the keys present in `patch` into this filter
    pub fn set_filter(&mut self, patch: FilterPatch) {
        if let Some(search) = patch.search {
            // An empty search box is the same as no search
            self.search = search.filter(|s| !s.is_empty());
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(is_done) = patch.is_done {
            self.is_done = is_done;
        }
        if let Some(due) = patch.due {
            self.due = due;
        }
    }

    /// Reset every constraint
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn has_active_filters(&self) -> bool {
        *self != Self::default()
    }

    /// Query parameters for the list endpoint, present fields only
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();

        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            query.push(("search", search.to_string()));
        }
        if let Some(priority) = self.priority {
            query.push(("priority", priority.as_str().to_string()));
        }
        if let Some(category) = self.category {
            query.push(("category", category.as_str().to_string()));
        }
        if let Some(is_done) = self.is_done {
            query.push(("is_done", is_done.to_string()));
        }
        if let Some(due) = self.due {
            query.push(("due_filter", due.as_str().to_string()));
        }

        query
    }
}
