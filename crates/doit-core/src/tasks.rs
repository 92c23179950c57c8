//! Locally cached task view kept consistent with the remote store.
//!
//! Reads are served from the cache; mutations go to the backend. Completion
//! toggles are optimistic: the cache changes before the request is sent, and
//! a failed request restores the snapshot taken before the speculative
//! write.

use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result, bail};
use tokio::task::JoinHandle;
use tracing::{error, warn};

use crate::api::{ApiClient, Category, Task, TaskDraft};
use crate::observe::Subscribers;

struct CacheState {
    tasks: Vec<Task>,
    selected_category: Category,
}

/// Shared task cache plus the active category filter.
///
/// Cheap to clone; clones share cache, filter and subscriber list. Only this
/// store's own operations write the cache. The lock is never held across an
/// await point, so in-flight requests never block reads.
#[derive(Clone)]
pub struct TaskStore {
    api: ApiClient,
    state: Arc<Mutex<CacheState>>,
    subscribers: Arc<Subscribers<Vec<Task>>>,
}

impl TaskStore {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            state: Arc::new(Mutex::new(CacheState {
                tasks: Vec::new(),
                selected_category: Category::Personal,
            })),
            subscribers: Arc::new(Subscribers::new()),
        }
    }

    /// Fetches the full task list and replaces the cache wholesale.
    ///
    /// On failure the existing cache is left untouched, so reads stay
    /// consistent, if stale.
    ///
    /// # Errors
    /// Returns the backend error after logging it; no state changes on
    /// failure.
    pub async fn load_all(&self) -> Result<()> {
        match self.api.list_tasks().await {
            Ok(tasks) => {
                self.mutate_cache(|cache| *cache = tasks);
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "failed to fetch tasks");
                Err(err).context("fetch tasks")
            }
        }
    }

    /// Creates a task on the backend and appends the canonical record.
    ///
    /// Drafts whose trimmed title is empty are rejected locally; no request
    /// is sent. This path is deliberately not optimistic: nothing enters the
    /// cache until the backend has assigned an id. On failure the cache is
    /// unchanged and the draft is dropped; the caller's input is not
    /// re-populated, a known usability gap kept from the original flow.
    ///
    /// # Errors
    /// Returns an error for an empty title or a failed request.
    pub async fn create(&self, draft: TaskDraft) -> Result<Task> {
        if draft.title.trim().is_empty() {
            bail!("task title must not be empty");
        }
        let task = self.api.create_task(&draft).await.context("create task")?;
        let appended = task.clone();
        self.mutate_cache(|cache| cache.push(appended));
        Ok(task)
    }

    /// Optimistically sets the completion flag of the task with `id`.
    ///
    /// The cache is updated before the request is sent, so reads observe the
    /// new value immediately. The returned handle settles when the request
    /// does: on success the optimistic value stands (the response body is
    /// not authoritative); on failure the entire pre-write snapshot is
    /// restored, discarding any cache mutations made in between. Overlapping
    /// calls therefore race on rollback; the last snapshot to be restored
    /// wins.
    ///
    /// An `id` absent from the cache leaves the cache as-is but still issues
    /// the request.
    pub fn set_completion(&self, id: &str, completed: bool) -> JoinHandle<Result<()>> {
        let (snapshot, tasks) = {
            let mut state = self.lock();
            let snapshot = state.tasks.clone();
            if let Some(task) = state.tasks.iter_mut().find(|task| task.id == id) {
                task.completed = completed;
            }
            (snapshot, state.tasks.clone())
        };
        self.subscribers.notify(&tasks);

        let store = self.clone();
        let id = id.to_string();
        tokio::spawn(async move {
            if let Err(err) = store.api.set_task_completion(&id, completed).await {
                warn!(task = %id, error = %err, "completion update failed, restoring snapshot");
                store.mutate_cache(|cache| *cache = snapshot);
                return Err(err).context("update task completion");
            }
            Ok(())
        })
    }

    /// Snapshot of the full cache, in server order.
    pub fn tasks(&self) -> Vec<Task> {
        self.lock().tasks.clone()
    }

    /// Cached tasks in the selected category, preserving cache order.
    pub fn filtered_tasks(&self) -> Vec<Task> {
        let state = self.lock();
        state
            .tasks
            .iter()
            .filter(|task| task.category == state.selected_category)
            .cloned()
            .collect()
    }

    /// Active category filter.
    pub fn selected_category(&self) -> Category {
        self.lock().selected_category
    }

    /// Switches the view filter. Pure and immediate; persisted data and
    /// subscribers are unaffected.
    pub fn set_selected_category(&self, category: Category) {
        self.lock().selected_category = category;
    }

    /// Registers a callback invoked synchronously with the new cache
    /// contents after every cache change.
    pub fn subscribe(&self, callback: impl Fn(&Vec<Task>) + Send + Sync + 'static) {
        self.subscribers.subscribe(callback);
    }

    /// Applies `mutate` to the cache, then notifies subscribers.
    fn mutate_cache(&self, mutate: impl FnOnce(&mut Vec<Task>)) {
        let tasks = {
            let mut state = self.lock();
            mutate(&mut state.tasks);
            state.tasks.clone()
        };
        // Lock released before callbacks run, so subscribers may read back.
        self.subscribers.notify(&tasks);
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().expect("task cache lock poisoned")
    }
}
