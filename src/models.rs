//! Task data models (wire types shared with the REST backend)
//!
//! Field names follow the backend's JSON exactly, so everything here
//! serializes without renames except the enum variants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Backend-assigned task identifier.
///
/// Opaque to the client. The backend hands out integers, but string ids are
/// accepted too, and either form is echoed back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskId {
    Numeric(i64),
    Text(String),
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl FromStr for TaskId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.parse::<i64>() {
            Ok(n) => Self::Numeric(n),
            Err(_) => Self::Text(s.to_string()),
        })
    }
}

impl From<i64> for TaskId {
    fn from(n: i64) -> Self {
        Self::Numeric(n)
    }
}

/// Priority level for tasks
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

/// Task category
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Work,
    Personal,
    Shopping,
    Health,
    Education,
    #[default]
    Other,
}

/// Due-date bucket understood by the list endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DueFilter {
    Overdue,
    Today,
    ThisWeek,
}

impl Priority {
    /// Lowercase wire form, as used in query strings
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Work => "work",
            Self::Personal => "personal",
            Self::Shopping => "shopping",
            Self::Health => "health",
            Self::Education => "education",
            Self::Other => "other",
        }
    }
}

impl DueFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Overdue => "overdue",
            Self::Today => "today",
            Self::ThisWeek => "this_week",
        }
    }
}

/// Error returned when parsing one of the enum wire forms fails
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

macro_rules! wire_from_str {
    ($ty:ty, $kind:literal, [$($variant:expr),+ $(,)?]) => {
        impl FromStr for $ty {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_ascii_lowercase();
                [$($variant),+]
                    .into_iter()
                    .find(|v| v.as_str() == wanted)
                    .ok_or_else(|| ParseEnumError {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_from_str!(
    Priority,
    "priority",
    [Priority::Low, Priority::Medium, Priority::High, Priority::Urgent]
);
wire_from_str!(
    Category,
    "category",
    [
        Category::Work,
        Category::Personal,
        Category::Shopping,
        Category::Health,
        Category::Education,
        Category::Other,
    ]
);
wire_from_str!(
    DueFilter,
    "due filter",
    [DueFilter::Overdue, DueFilter::Today, DueFilter::ThisWeek]
);

/// A task/todo item as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub is_done: bool,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Writable task fields, sent as the body of create and update
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub category: Category,
    pub is_done: bool,
    pub due_date: Option<DateTime<Utc>>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Trim the title and blank description; `None` when the title is empty.
    ///
    /// Drafts that normalize to `None` must never be sent.
    pub fn normalized(&self) -> Option<Self> {
        let title = self.title.trim();
        if title.is_empty() {
            return None;
        }

        let description = self
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        Some(Self {
            title: title.to_string(),
            description,
            ..self.clone()
        })
    }
}

impl From<&Task> for TaskDraft {
    fn from(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            priority: task.priority,
            category: task.category,
            is_done: task.is_done,
            due_date: task.due_date,
        }
    }
}

/// Body of the list endpoints: a bare array or a paginated wrapper
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TaskListPayload {
    Plain(Vec<Task>),
    Paginated { results: Vec<Task> },
}

impl TaskListPayload {
    pub fn into_tasks(self) -> Vec<Task> {
        match self {
            Self::Plain(tasks) | Self::Paginated { results: tasks } => tasks,
        }
    }
}

/// Request to delete several tasks at once
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkDeleteRequest {
    pub task_ids: Vec<TaskId>,
}

/// Request to set the completion flag on several tasks at once
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkUpdateRequest {
    pub task_ids: Vec<TaskId>,
    pub is_done: bool,
}
