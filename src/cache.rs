//! In-memory mirror of the last fetched task list

use std::collections::HashSet;

use crate::models::{Task, TaskId};

/// Ordered task list as the backend last returned it (newest first).
///
/// Order is never re-sorted locally; only head insertion and in-place
/// replacement are allowed.
#[derive(Debug, Clone, Default)]
pub struct TaskCache {
    tasks: Vec<Task>,
}

impl TaskCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole list with a fresh fetch.
    ///
    /// Ids stay unique: a repeated id keeps its first occurrence.
    pub fn set_all(&mut self, tasks: Vec<Task>) {
        let mut seen = HashSet::with_capacity(tasks.len());
        self.tasks = tasks
            .into_iter()
            .filter(|t| seen.insert(t.id.clone()))
            .collect();
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    /// Insert a newly created task at the head
    pub fn insert_front(&mut self, task: Task) {
        self.tasks.retain(|t| t.id != task.id);
        self.tasks.insert(0, task);
    }

    /// Replace a task in place by id, or insert it at the head if unknown
    pub fn upsert(&mut self, task: Task) {
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(slot) => *slot = task,
            None => self.tasks.insert(0, task),
        }
    }

    /// Replace a task in place; tasks not in the list are left out
    pub fn replace(&mut self, task: Task) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(slot) => {
                *slot = task;
                true
            }
            None => false,
        }
    }

    /// Remove a task; returns whether it was present
    pub fn remove(&mut self, id: &TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| &t.id != id);
        self.tasks.len() != before
    }

    /// Remove every task whose id is listed, in one pass
    pub fn remove_many(&mut self, ids: &[TaskId]) -> usize {
        let doomed: HashSet<&TaskId> = ids.iter().collect();
        let before = self.tasks.len();
        self.tasks.retain(|t| !doomed.contains(&t.id));
        before - self.tasks.len()
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    pub fn contains(&self, id: &TaskId) -> bool {
        self.get(id).is_some()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn ids(&self) -> impl Iterator<Item = &TaskId> {
        self.tasks.iter().map(|t| &t.id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
