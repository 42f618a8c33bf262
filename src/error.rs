//! Error types for backend calls and controller operations

use thiserror::Error;

/// Failure talking to the backend
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("server responded with {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response shape: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BackendError::Malformed(err.to_string())
        } else if let Some(status) = err.status() {
            BackendError::Status {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else {
            BackendError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::Malformed(err.to_string())
    }
}

/// Failed controller operation, tagged with what was being attempted
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncError {
    #[error("failed to fetch tasks: {0}")]
    FetchTasks(#[source] BackendError),

    #[error("failed to fetch stats: {0}")]
    FetchStats(#[source] BackendError),

    #[error("failed to create task: {0}")]
    Create(#[source] BackendError),

    #[error("failed to update task: {0}")]
    Update(#[source] BackendError),

    #[error("failed to toggle task: {0}")]
    Toggle(#[source] BackendError),

    #[error("failed to delete task: {0}")]
    Delete(#[source] BackendError),

    #[error("failed to bulk delete tasks: {0}")]
    BulkDelete(#[source] BackendError),

    #[error("failed to reload task: {0}")]
    Reload(#[source] BackendError),

    #[error("failed to set task completion: {0}")]
    SetCompletion(#[source] BackendError),

    #[error("failed to bulk update tasks: {0}")]
    BulkUpdate(#[source] BackendError),

    #[error("failed to fetch task view: {0}")]
    FetchView(#[source] BackendError),
}

impl SyncError {
    /// Fixed message shown to the user for this kind of failure
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::FetchTasks(_) => "Failed to fetch tasks. Make sure the server is running.",
            Self::FetchStats(_) => "Failed to load statistics.",
            Self::Create(_) => "Failed to add task. Please try again.",
            Self::Update(_) | Self::Toggle(_) | Self::SetCompletion(_) | Self::Reload(_) => {
                "Failed to update task. Please try again."
            }
            Self::Delete(_) => "Failed to delete task. Please try again.",
            Self::BulkDelete(_) => "Failed to delete selected tasks. Please try again.",
            Self::BulkUpdate(_) => "Failed to update selected tasks. Please try again.",
            Self::FetchView(_) => "Failed to load tasks. Please try again.",
        }
    }

    /// Underlying transport detail
    pub fn backend(&self) -> &BackendError {
        match self {
            Self::FetchTasks(e)
            | Self::FetchStats(e)
            | Self::Create(e)
            | Self::Update(e)
            | Self::Toggle(e)
            | Self::Delete(e)
            | Self::BulkDelete(e)
            | Self::Reload(e)
            | Self::SetCompletion(e)
            | Self::BulkUpdate(e)
            | Self::FetchView(e) => e,
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
