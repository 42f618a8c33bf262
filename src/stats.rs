//! Aggregate statistics, computed by the backend and cached as-is

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{Category, Priority};

/// Summary returned by `GET /tasks/stats/`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TaskStats {
    pub total_tasks: u64,
    pub completed_tasks: u64,
    pub pending_tasks: u64,
    /// Percentage in 0..=100
    pub completion_rate: f64,
    #[serde(default)]
    pub overdue_tasks: u64,
    #[serde(default)]
    pub priority_stats: BTreeMap<Priority, u64>,
    #[serde(default)]
    pub category_stats: BTreeMap<Category, u64>,
}

/// Last successfully fetched stats. Replaced wholesale, never patched.
#[derive(Debug, Clone, Default)]
pub struct StatsSnapshot {
    current: Option<TaskStats>,
}

impl StatsSnapshot {
    pub fn replace(&mut self, stats: TaskStats) {
        self.current = Some(stats);
    }

    pub fn get(&self) -> Option<&TaskStats> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_backend_stats() {
        let stats: TaskStats = serde_json::from_value(json!({
            "total_tasks": 5,
            "completed_tasks": 2,
            "pending_tasks": 3,
            "completion_rate": 40.0,
            "overdue_tasks": 1,
            "priority_stats": {"low": 1, "medium": 2, "high": 1, "urgent": 1},
            "category_stats": {"work": 3, "other": 2}
        }))
        .unwrap();

        assert_eq!(stats.total_tasks, 5);
        assert_eq!(stats.priority_stats[&Priority::Medium], 2);
        assert_eq!(stats.category_stats[&Category::Work], 3);
        assert!(!stats.category_stats.contains_key(&Category::Health));
    }

    #[test]
    fn snapshot_replaces_wholesale() {
        let mut snapshot = StatsSnapshot::default();
        assert!(snapshot.get().is_none());

        snapshot.replace(TaskStats {
            total_tasks: 3,
            ..Default::default()
        });
        snapshot.replace(TaskStats {
            total_tasks: 1,
            completed_tasks: 1,
            ..Default::default()
        });

        let current = snapshot.get().unwrap();
        assert_eq!(current.total_tasks, 1);
        assert_eq!(current.completed_tasks, 1);
    }
}
