//! Sync controller: the single writer of the task cache and stats snapshot
//!
//! Every operation talks to the [`Backend`], then reconciles the response
//! into local state. State sits behind a mutex that is only taken between
//! awaits, so operations may overlap freely on one runtime. List fetches are
//! sequence-numbered: a response is applied only if nothing newer has been
//! applied already, which makes the latest filter change win. Cache edits
//! made while a fetch is in flight are replayed onto its response, so a list
//! requested before a create or delete cannot undo it.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::api::{Backend, TaskView};
use crate::cache::TaskCache;
use crate::error::{BackendError, Result, SyncError};
use crate::filter::{FilterPatch, TaskFilter};
use crate::models::{Task, TaskDraft, TaskId};
use crate::selection::Selection;
use crate::stats::{StatsSnapshot, TaskStats};

/// A local cache change that a list response dispatched earlier may predate
#[derive(Debug, Clone)]
enum CacheEdit {
    Created(Task),
    Replaced(Task),
    Removed(Vec<TaskId>),
}

impl CacheEdit {
    /// Returns how many cached tasks the edit touched
    fn apply(&self, cache: &mut TaskCache) -> usize {
        match self {
            Self::Created(task) => {
                cache.insert_front(task.clone());
                1
            }
            Self::Replaced(task) => usize::from(cache.replace(task.clone())),
            Self::Removed(ids) => cache.remove_many(ids),
        }
    }
}

#[derive(Debug, Default)]
struct State {
    filter: TaskFilter,
    cache: TaskCache,
    stats: StatsSnapshot,
    error: Option<SyncError>,
    /// Sequence of the newest list fetch whose outcome was applied
    applied_fetch: u64,
    applied_stats: u64,
    /// Edits tagged with the newest fetch dispatched when they were made
    pending: Vec<(u64, CacheEdit)>,
}

pub struct SyncController<B> {
    backend: B,
    state: Mutex<State>,
    fetch_seq: AtomicU64,
    stats_seq: AtomicU64,
}

impl<B: Backend> SyncController<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: Mutex::new(State::default()),
            fetch_seq: AtomicU64::new(0),
            stats_seq: AtomicU64::new(0),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    // ---- read side -------------------------------------------------------

    /// Copy of the cached task list, in server order
    pub fn tasks(&self) -> Vec<Task> {
        self.state.lock().cache.tasks().to_vec()
    }

    pub fn task(&self, id: &TaskId) -> Option<Task> {
        self.state.lock().cache.get(id).cloned()
    }

    /// Run `f` against the cache without copying it
    pub fn with_cache<R>(&self, f: impl FnOnce(&TaskCache) -> R) -> R {
        f(&self.state.lock().cache)
    }

    pub fn stats(&self) -> Option<TaskStats> {
        self.state.lock().stats.get().cloned()
    }

    pub fn filter(&self) -> TaskFilter {
        self.state.lock().filter.clone()
    }

    pub fn error(&self) -> Option<SyncError> {
        self.state.lock().error.clone()
    }

    /// User-facing message for the current error, if any
    pub fn error_message(&self) -> Option<&'static str> {
        self.state.lock().error.as_ref().map(SyncError::user_message)
    }

    pub fn clear_error(&self) {
        self.state.lock().error = None;
    }

    /// True while the most recently dispatched list fetch is outstanding
    pub fn is_loading(&self) -> bool {
        self.fetch_seq.load(Ordering::SeqCst) > self.state.lock().applied_fetch
    }

    // ---- filter ----------------------------------------------------------

    /// Merge `patch` into the filter and re-fetch
    pub async fn set_filter(&self, patch: FilterPatch) -> Result<()> {
        {
            let mut state = self.state.lock();
            state.filter.set_filter(patch);
        }
        self.fetch_tasks().await
    }

    /// Reset the filter and re-fetch
    pub async fn clear_filters(&self) -> Result<()> {
        {
            let mut state = self.state.lock();
            state.filter.clear();
        }
        self.fetch_tasks().await
    }

    // ---- fetches ---------------------------------------------------------

    /// Fetch the task list for the current filter.
    ///
    /// Success replaces the cache and clears the error. Failure empties the
    /// cache so stale tasks are never shown as current. A response overtaken
    /// by a newer fetch is dropped and reported as `Ok`.
    pub async fn fetch_tasks(&self) -> Result<()> {
        let (seq, query) = {
            let state = self.state.lock();
            let seq = self.fetch_seq.fetch_add(1, Ordering::SeqCst) + 1;
            (seq, state.filter.to_query())
        };

        tracing::debug!(seq, params = query.len(), "Fetching tasks");
        let result = self.backend.list_tasks(&query).await;

        let mut guard = self.state.lock();
        let state = &mut *guard;
        if seq <= state.applied_fetch {
            tracing::debug!(
                seq,
                applied = state.applied_fetch,
                "Discarding superseded task list"
            );
            return Ok(());
        }
        state.applied_fetch = seq;
        // Edits made before this fetch went out are already in the response
        state.pending.retain(|(tag, _)| *tag >= seq);

        let outcome = match result {
            Ok(tasks) => {
                tracing::debug!(seq, count = tasks.len(), "Task list refreshed");
                state.cache.set_all(tasks);
                for (_, edit) in &state.pending {
                    edit.apply(&mut state.cache);
                }
                state.error = None;
                Ok(())
            }
            Err(e) => {
                state.cache.clear();
                Err(Self::record(state, SyncError::FetchTasks(e)))
            }
        };
        state.pending.retain(|(tag, _)| *tag > seq);
        outcome
    }

    /// Fetch and replace the stats snapshot.
    ///
    /// Failure keeps whatever snapshot was there and leaves the error state
    /// alone; stats are advisory.
    pub async fn fetch_stats(&self) -> Result<()> {
        let seq = self.stats_seq.fetch_add(1, Ordering::SeqCst) + 1;

        match self.backend.stats().await {
            Ok(stats) => {
                let mut state = self.state.lock();
                if seq > state.applied_stats {
                    state.applied_stats = seq;
                    state.stats.replace(stats);
                } else {
                    tracing::debug!(seq, "Discarding superseded stats");
                }
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Stats refresh failed, keeping previous snapshot");
                Err(SyncError::FetchStats(e))
            }
        }
    }

    /// `fetch_tasks` and `fetch_stats` together
    pub async fn refresh(&self) -> Result<()> {
        let (tasks, _) = tokio::join!(self.fetch_tasks(), self.fetch_stats());
        tasks
    }

    /// Tasks past their due date, from the dedicated endpoint. Cache untouched.
    pub async fn fetch_overdue(&self) -> Result<Vec<Task>> {
        self.fetch_view(TaskView::Overdue).await
    }

    /// Tasks due today, from the dedicated endpoint. Cache untouched.
    pub async fn fetch_due_today(&self) -> Result<Vec<Task>> {
        self.fetch_view(TaskView::DueToday).await
    }

    async fn fetch_view(&self, view: TaskView) -> Result<Vec<Task>> {
        let result = self.backend.list_view(view).await;
        self.settle(result, SyncError::FetchView, |_, _| ())
    }

    // ---- mutations -------------------------------------------------------

    /// Create a task and put it at the head of the cache.
    ///
    /// A draft whose trimmed title is empty is not sent; `Ok(None)` is
    /// returned and nothing changes.
    pub async fn create_task(&self, draft: &TaskDraft) -> Result<Option<Task>> {
        let Some(draft) = draft.normalized() else {
            tracing::debug!("Ignoring task with empty title");
            return Ok(None);
        };

        let result = self.backend.create_task(&draft).await;
        let task = self.settle(result, SyncError::Create, |state, task: &Task| {
            self.edit_cache(state, CacheEdit::Created(task.clone()));
        })?;

        tracing::info!(id = %task.id, title = %task.title, "Task created");
        self.refresh_stats().await;
        Ok(Some(task))
    }

    /// Replace a task's fields. Same empty-title rule as `create_task`.
    pub async fn update_task(&self, id: &TaskId, draft: &TaskDraft) -> Result<Option<Task>> {
        let Some(draft) = draft.normalized() else {
            tracing::debug!(%id, "Ignoring update with empty title");
            return Ok(None);
        };

        let result = self.backend.update_task(id, &draft).await;
        let task = self.settle(result, SyncError::Update, |state, task: &Task| {
            self.edit_cache(state, CacheEdit::Replaced(task.clone()));
        })?;

        tracing::info!(%id, "Task updated");
        self.refresh_stats().await;
        Ok(Some(task))
    }

    /// Flip completion through the toggle endpoint
    pub async fn toggle_task(&self, id: &TaskId) -> Result<Task> {
        let result = self.backend.toggle_task(id).await;
        let task = self.settle(result, SyncError::Toggle, |state, task: &Task| {
            self.edit_cache(state, CacheEdit::Replaced(task.clone()));
        })?;

        tracing::info!(%id, is_done = task.is_done, "Task toggled");
        self.refresh_stats().await;
        Ok(task)
    }

    /// Set completion explicitly rather than flipping it
    pub async fn set_completion(&self, id: &TaskId, done: bool) -> Result<Task> {
        let result = self.backend.set_completion(id, done).await;
        let task = self.settle(result, SyncError::SetCompletion, |state, task: &Task| {
            self.edit_cache(state, CacheEdit::Replaced(task.clone()));
        })?;

        tracing::info!(%id, is_done = task.is_done, "Task completion set");
        self.refresh_stats().await;
        Ok(task)
    }

    /// Re-read one task from the backend
    pub async fn reload_task(&self, id: &TaskId) -> Result<Task> {
        let result = self.backend.get_task(id).await;
        self.settle(result, SyncError::Reload, |state, task: &Task| {
            state.cache.upsert(task.clone());
        })
    }

    /// Delete a task; the cache only changes once the backend confirms
    pub async fn delete_task(&self, id: &TaskId) -> Result<()> {
        let result = self.backend.delete_task(id).await;
        self.settle(result, SyncError::Delete, |state, _| {
            self.edit_cache(state, CacheEdit::Removed(vec![id.clone()]));
        })?;

        tracing::info!(%id, "Task deleted");
        self.refresh_stats().await;
        Ok(())
    }

    /// Delete several tasks in one request.
    ///
    /// All-or-nothing from the client's view: on failure the cache is left
    /// as it was. Returns how many cached tasks were removed.
    pub async fn bulk_delete(&self, ids: &[TaskId]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = self.backend.bulk_delete(ids).await;
        let mut removed = 0;
        self.settle(result, SyncError::BulkDelete, |state, _| {
            removed = self.edit_cache(state, CacheEdit::Removed(ids.to_vec()));
        })?;

        tracing::info!(requested = ids.len(), removed, "Tasks bulk deleted");
        self.refresh_stats().await;
        Ok(removed)
    }

    /// Re-fetch the list, then drop selected ids it no longer contains.
    ///
    /// The selection belongs to the caller, so a plain `fetch_tasks` leaves
    /// it alone. A failed fetch empties the cache and with it the selection.
    pub async fn refetch_selection(&self, selection: &mut Selection) -> Result<()> {
        let result = self.fetch_tasks().await;
        self.with_cache(|cache| selection.retain_present(cache));
        result
    }

    /// Bulk delete whatever is selected, then clear the selection
    pub async fn bulk_delete_selected(&self, selection: &mut Selection) -> Result<usize> {
        let ids = self.with_cache(|cache| selection.ids_in(cache));
        let removed = self.bulk_delete(&ids).await?;
        selection.clear();
        Ok(removed)
    }

    /// Set completion on several tasks, then re-fetch list and stats
    pub async fn bulk_set_completion(&self, ids: &[TaskId], done: bool) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let result = self.backend.bulk_update(ids, done).await;
        self.settle(result, SyncError::BulkUpdate, |_, _| ())?;

        tracing::info!(count = ids.len(), is_done = done, "Tasks bulk updated");
        self.refresh().await
    }

    // ---- helpers ---------------------------------------------------------

    /// Apply a backend result: on success run `apply` and clear the error,
    /// on failure record the tagged error and leave the cache alone.
    fn settle<T>(
        &self,
        result: std::result::Result<T, BackendError>,
        kind: fn(BackendError) -> SyncError,
        apply: impl FnOnce(&mut State, &T),
    ) -> Result<T> {
        let mut state = self.state.lock();
        match result {
            Ok(value) => {
                apply(&mut *state, &value);
                state.error = None;
                Ok(value)
            }
            Err(e) => Err(Self::record(&mut *state, kind(e))),
        }
    }

    /// Apply `edit` and keep it for replay while a list fetch is in flight
    fn edit_cache(&self, state: &mut State, edit: CacheEdit) -> usize {
        let changed = edit.apply(&mut state.cache);
        let dispatched = self.fetch_seq.load(Ordering::SeqCst);
        if dispatched > state.applied_fetch {
            state.pending.push((dispatched, edit));
        }
        changed
    }

    fn record(state: &mut State, err: SyncError) -> SyncError {
        tracing::warn!(error = %err, "Sync operation failed");
        state.error = Some(err.clone());
        err
    }

    async fn refresh_stats(&self) {
        // Failure is already logged and the old snapshot kept
        let _ = self.fetch_stats().await;
    }
}
