//! todo-sync - client-side sync state for a REST todo backend
//!
//! Keeps a filtered task list, a stats snapshot and the last error in step
//! with the server. [`SyncController`] is the only writer; everything else
//! reads copies.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod render;
pub mod selection;
pub mod stats;
pub mod sync;

pub use api::{Backend, HttpBackend, TaskView};
pub use cache::TaskCache;
pub use config::Config;
pub use error::{BackendError, SyncError};
pub use filter::{FilterPatch, TaskFilter};
pub use models::{Category, DueFilter, Priority, Task, TaskDraft, TaskId};
pub use selection::Selection;
pub use stats::{StatsSnapshot, TaskStats};
pub use sync::SyncController;
