// Task collection engine - canonical in-memory task list for one signed-in user
// Every mutation: snapshot first, mutate, re-scan timers, debounced persist.
// The in-memory state is the source of truth for the running session.

use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::history::HistoryStack;
use crate::models::{AlertRecord, EngineConfig, Filter, Subtask, Task};
use crate::scheduler::{NotificationScheduler, NotificationSink};
use crate::storage::{tasksKey, StoreAdapter};

/// Owns the task collection for one user identity, scoped to the lifetime of
/// the active session. Clones share the same state.
///
/// Requires an ambient Tokio runtime: the debounced persist and the due-date
/// timers are spawned tasks. Whoever creates an engine must route every exit
/// path through [`TaskEngine::close`] so pending work is flushed, not dropped.
#[derive(Clone)]
pub struct TaskEngine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    userKey: String,
    config: EngineConfig,
    store: Arc<dyn StoreAdapter>,
    tasks: RwLock<Vec<Task>>,
    history: Mutex<HistoryStack>,
    persistTimer: Mutex<Option<JoinHandle<()>>>,
    scheduler: NotificationScheduler,
}

impl TaskEngine {
    /// Load the collection for `userKey` with default tunables
    pub fn load(
        userKey: &str,
        store: Arc<dyn StoreAdapter>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self::loadWith(EngineConfig::default(), userKey, store, sink)
    }

    /// Load the collection for `userKey`. An absent record or one that fails
    /// to parse degrades to an empty collection - corrupt store is never
    /// fatal. All tasks start unarmed and are evaluated once against the
    /// current clock.
    pub fn loadWith(
        config: EngineConfig,
        userKey: &str,
        store: Arc<dyn StoreAdapter>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        let mut tasks: Vec<Task> = match store.get(&tasksKey(userKey)) {
            None => Vec::new(),
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(v) => v,
                Err(e) => {
                    warn!(
                        "[TaskEngine::load] stored tasks for '{}' failed to parse, starting empty: {}",
                        userKey, e
                    );
                    Vec::new()
                }
            },
        };

        let scheduler =
            NotificationScheduler::load(userKey, Arc::clone(&store), sink, config.alertLogCap);
        scheduler.rescan(&mut tasks);

        Self {
            inner: Arc::new(EngineInner {
                userKey: userKey.to_string(),
                history: Mutex::new(HistoryStack::new(config.historyCap)),
                config,
                store,
                tasks: RwLock::new(tasks),
                persistTimer: Mutex::new(None),
                scheduler,
            }),
        }
    }

    // ============================================
    // READS
    // ============================================

    /// Snapshot of the full collection, newest first
    pub fn tasks(&self) -> Vec<Task> {
        self.inner.tasks.read().clone()
    }

    pub fn task(&self, id: &str) -> Option<Task> {
        self.inner.tasks.read().iter().find(|t| t.id == id).cloned()
    }

    /// Tasks for a sidebar view (all / pending / completed)
    pub fn visible(&self, filter: Filter) -> Vec<Task> {
        self.inner
            .tasks
            .read()
            .iter()
            .filter(|t| match filter {
                Filter::All => true,
                Filter::Pending => !t.done,
                Filter::Completed => t.done,
            })
            .cloned()
            .collect()
    }

    /// Alert history, newest first
    pub fn alerts(&self) -> Vec<AlertRecord> {
        self.inner.scheduler.alerts()
    }

    pub fn notificationsEnabled(&self) -> bool {
        self.inner.scheduler.isEnabled()
    }

    // ============================================
    // MUTATIONS
    // ============================================

    /// Create a task with defaults and prepend it (newest-first ordering).
    /// An empty or whitespace-only title is a silent no-op.
    pub fn addTask(&self, title: &str) -> Option<Task> {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            debug!("[TaskEngine::addTask] empty title, ignoring");
            return None;
        }
        let task = Task::new(trimmed.to_string());
        let mut tasks = self.inner.tasks.write();
        self.inner.history.lock().push(tasks.clone());
        tasks.insert(0, task);
        self.inner.scheduler.rescan(&mut tasks);
        let stored = tasks[0].clone();
        drop(tasks);
        self.schedulePersist();
        Some(stored)
    }

    /// Replace the full record matching `updated.id`. `createdAt` is pinned
    /// to the stored record (immutable once created). An unknown id is a
    /// logged no-op - ids always originate from a rendered task, so a miss is
    /// a stale reference, not an error.
    pub fn updateTask(&self, updated: Task) -> Option<Task> {
        let mut tasks = self.inner.tasks.write();
        let Some(idx) = tasks.iter().position(|t| t.id == updated.id) else {
            warn!(
                "[TaskEngine::updateTask] no task with id '{}', ignoring",
                updated.id
            );
            return None;
        };
        self.inner.history.lock().push(tasks.clone());
        let mut merged = updated;
        merged.createdAt = tasks[idx].createdAt;
        tasks[idx] = merged;
        self.inner.scheduler.rescan(&mut tasks);
        let stored = tasks[idx].clone();
        drop(tasks);
        self.schedulePersist();
        Some(stored)
    }

    /// Delete is idempotent: an absent id pushes no snapshot and persists
    /// nothing.
    pub fn deleteTask(&self, id: &str) {
        let mut tasks = self.inner.tasks.write();
        let Some(idx) = tasks.iter().position(|t| t.id == id) else {
            debug!("[TaskEngine::deleteTask] id '{}' already absent", id);
            return;
        };
        self.inner.history.lock().push(tasks.clone());
        tasks.remove(idx);
        self.inner.scheduler.rescan(&mut tasks);
        drop(tasks);
        self.schedulePersist();
    }

    pub fn toggleDone(&self, id: &str) -> Option<Task> {
        let Some(mut updated) = self.task(id) else {
            warn!("[TaskEngine::toggleDone] no task with id '{}'", id);
            return None;
        };
        updated.done = !updated.done;
        self.updateTask(updated)
    }

    /// Append a subtask; an empty title is a silent no-op like addTask
    pub fn addSubtask(&self, taskId: &str, title: &str) -> Option<Task> {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            debug!("[TaskEngine::addSubtask] empty title, ignoring");
            return None;
        }
        let Some(mut updated) = self.task(taskId) else {
            warn!("[TaskEngine::addSubtask] no task with id '{}'", taskId);
            return None;
        };
        updated.subtasks.push(Subtask::new(trimmed.to_string()));
        self.updateTask(updated)
    }

    pub fn toggleSubtask(&self, taskId: &str, subId: &str) -> Option<Task> {
        let Some(mut updated) = self.task(taskId) else {
            warn!("[TaskEngine::toggleSubtask] no task with id '{}'", taskId);
            return None;
        };
        let Some(sub) = updated.subtasks.iter_mut().find(|s| s.id == subId) else {
            warn!(
                "[TaskEngine::toggleSubtask] no subtask '{}' on task '{}'",
                subId, taskId
            );
            return None;
        };
        sub.done = !sub.done;
        self.updateTask(updated)
    }

    /// Replace a task's labels, trimming entries and dropping empties
    pub fn setLabels(&self, taskId: &str, labels: Vec<String>) -> Option<Task> {
        let Some(mut updated) = self.task(taskId) else {
            warn!("[TaskEngine::setLabels] no task with id '{}'", taskId);
            return None;
        };
        updated.labels = labels
            .into_iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        self.updateTask(updated)
    }

    /// Atomic reorder: remove the task at `fromId`'s position and reinsert it
    /// at `toId`'s pre-removal position. Exactly one snapshot and one persist
    /// cycle; unknown ids or a self-move change nothing.
    pub fn moveTask(&self, fromId: &str, toId: &str) -> bool {
        if fromId == toId {
            return false;
        }
        let mut tasks = self.inner.tasks.write();
        let (Some(fromIdx), Some(toIdx)) = (
            tasks.iter().position(|t| t.id == fromId),
            tasks.iter().position(|t| t.id == toId),
        ) else {
            debug!(
                "[TaskEngine::moveTask] '{}' -> '{}' not resolvable, ignoring",
                fromId, toId
            );
            return false;
        };
        self.inner.history.lock().push(tasks.clone());
        let item = tasks.remove(fromIdx);
        let insertAt = toIdx.min(tasks.len());
        tasks.insert(insertAt, item);
        self.inner.scheduler.rescan(&mut tasks);
        drop(tasks);
        self.schedulePersist();
        true
    }

    /// Restore the most recent undo snapshot, parking the current collection
    /// on the redo side. An empty stack is a no-op. Undo persists like any
    /// other mutation.
    pub fn undo(&self) -> Vec<Task> {
        let mut tasks = self.inner.tasks.write();
        match self.inner.history.lock().undoSwap(tasks.clone()) {
            None => tasks.clone(),
            Some(prev) => {
                *tasks = prev;
                self.inner.scheduler.rescan(&mut tasks);
                let out = tasks.clone();
                drop(tasks);
                self.schedulePersist();
                out
            }
        }
    }

    /// Symmetric inverse of undo
    pub fn redo(&self) -> Vec<Task> {
        let mut tasks = self.inner.tasks.write();
        match self.inner.history.lock().redoSwap(tasks.clone()) {
            None => tasks.clone(),
            Some(next) => {
                *tasks = next;
                self.inner.scheduler.rescan(&mut tasks);
                let out = tasks.clone();
                drop(tasks);
                self.schedulePersist();
                out
            }
        }
    }

    /// Flip notifications for this user. Enabling prompts the sink; timers
    /// follow the new state immediately.
    pub fn toggleNotifications(&self) -> bool {
        let on = self.inner.scheduler.toggle();
        let mut tasks = self.inner.tasks.write();
        self.inner.scheduler.rescan(&mut tasks);
        on
    }

    // ============================================
    // PERSISTENCE & TEARDOWN
    // ============================================

    /// Reset (never stack) the debounce window: repeated mutations inside the
    /// window coalesce into a single write of the final state. The write
    /// never happens synchronously on the mutating call.
    fn schedulePersist(&self) {
        let mut slot = self.inner.persistTimer.lock();
        if let Some(prev) = slot.take() {
            prev.abort();
        }
        let delay = Duration::from_millis(self.inner.config.persistDebounceMs);
        let inner = Arc::clone(&self.inner);
        *slot = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            inner.persistNow();
        }));
    }

    /// Teardown: flush (not drop) a pending debounced persist and cancel all
    /// outstanding due-date timers. Safe to call more than once; every exit
    /// path of the owning view goes through here.
    pub fn close(&self) {
        let pending = self.inner.persistTimer.lock().take();
        if let Some(handle) = pending {
            handle.abort();
            self.inner.persistNow();
        }
        self.inner.scheduler.cancelAll();
    }
}

impl EngineInner {
    /// Write-through of the current collection. Failures are logged, never
    /// rolled back: the next successful write carries this state.
    fn persistNow(&self) {
        let json = {
            let tasks = self.tasks.read();
            match serde_json::to_string(&*tasks) {
                Ok(j) => j,
                Err(e) => {
                    warn!("[TaskEngine::persist] encode failed: {}", e);
                    return;
                }
            }
        };
        if let Err(e) = self.store.set(&tasksKey(&self.userKey), &json) {
            warn!(
                "[TaskEngine::persist] write for '{}' failed, keeping in-memory state: {}",
                self.userKey, e
            );
        }
    }
}
