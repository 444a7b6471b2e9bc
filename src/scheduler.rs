// Due-date notification scheduler
// One cancellable timer per armed task, registry keyed by task id.
// The scheduler never mutates the collection beyond the alertArmed marker.

use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::models::{now, AlertRecord, Task};
use crate::storage::{alertsKey, notifKey, StoreAdapter};

/// Notification title used for every due-date alert
pub const ALERT_TITLE: &str = "Listful — Task due";

/// Outcome of a permission query against the platform notification capability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
    Unprompted,
}

/// Capability for prompting the user and emitting fire-once alerts
pub trait NotificationSink: Send + Sync {
    fn requestPermission(&self) -> Permission;
    fn currentPermission(&self) -> Permission;
    fn fire(&self, title: &str, body: &str);
}

/// Per-task alert state. Absent from the registry = unarmed.
enum AlertEntry {
    Armed {
        dueAt: i64,
        title: String,
        timer: JoinHandle<()>,
    },
    Fired {
        dueAt: i64,
    },
}

impl AlertEntry {
    fn cancel(&self) {
        if let AlertEntry::Armed { timer, .. } = self {
            timer.abort();
        }
    }

    fn dueAt(&self) -> i64 {
        match self {
            AlertEntry::Armed { dueAt, .. } => *dueAt,
            AlertEntry::Fired { dueAt } => *dueAt,
        }
    }
}

/// Watches the collection for tasks with future due dates and arranges
/// exactly one pending alert per task per session.
#[derive(Clone)]
pub struct NotificationScheduler {
    inner: Arc<SchedulerInner>,
}

struct SchedulerInner {
    userKey: String,
    store: Arc<dyn StoreAdapter>,
    sink: Arc<dyn NotificationSink>,
    alertLogCap: usize,
    enabled: RwLock<bool>,
    alerts: RwLock<Vec<AlertRecord>>,
    entries: Mutex<HashMap<String, AlertEntry>>,
    shutdown: CancellationToken,
}

impl NotificationScheduler {
    /// Load per-user scheduler state. Notifications start enabled when the
    /// persisted flag is set or the sink already reports a granted permission.
    pub fn load(
        userKey: &str,
        store: Arc<dyn StoreAdapter>,
        sink: Arc<dyn NotificationSink>,
        alertLogCap: usize,
    ) -> Self {
        let alerts: Vec<AlertRecord> = store
            .get(&alertsKey(userKey))
            .and_then(|raw| match serde_json::from_str(&raw) {
                Ok(v) => Some(v),
                Err(e) => {
                    warn!(
                        "[NotificationScheduler::load] alert log for '{}' failed to parse, starting empty: {}",
                        userKey, e
                    );
                    None
                }
            })
            .unwrap_or_default();

        let flagSet = store
            .get(&notifKey(userKey))
            .and_then(|raw| serde_json::from_str::<bool>(&raw).ok())
            .unwrap_or(false);
        let enabled = flagSet || sink.currentPermission() == Permission::Granted;

        Self {
            inner: Arc::new(SchedulerInner {
                userKey: userKey.to_string(),
                store,
                sink,
                alertLogCap,
                enabled: RwLock::new(enabled),
                alerts: RwLock::new(alerts),
                entries: Mutex::new(HashMap::new()),
                shutdown: CancellationToken::new(),
            }),
        }
    }

    pub fn isEnabled(&self) -> bool {
        *self.inner.enabled.read()
    }

    /// Alert history, newest first
    pub fn alerts(&self) -> Vec<AlertRecord> {
        self.inner.alerts.read().clone()
    }

    /// Flip the notifications-enabled flag. Enabling prompts the sink for
    /// permission and only sticks on a grant; a denial leaves the scheduler
    /// inert. The caller re-scans the collection afterwards so timers follow
    /// the new state.
    pub fn toggle(&self) -> bool {
        if *self.inner.enabled.read() {
            *self.inner.enabled.write() = false;
            self.persistEnabled(false);
            return false;
        }
        match self.inner.sink.requestPermission() {
            Permission::Granted => {
                *self.inner.enabled.write() = true;
                self.persistEnabled(true);
                true
            }
            p => {
                debug!(
                    "[NotificationScheduler::toggle] permission not granted ({:?}), staying disabled",
                    p
                );
                false
            }
        }
    }

    fn persistEnabled(&self, on: bool) {
        let key = notifKey(&self.inner.userKey);
        if let Err(e) = self.inner.store.set(&key, if on { "true" } else { "false" }) {
            warn!("[NotificationScheduler::toggle] flag write failed: {}", e);
        }
    }

    /// Reconcile the timer registry with the current collection:
    /// - entries for vanished tasks, or tasks whose due date or title changed,
    ///   are cancelled and dropped;
    /// - unarmed tasks with a future due date are armed;
    /// - past or absent due dates never arm, and never fire retroactively;
    /// - every task's alertArmed marker is rewritten from the registry.
    pub fn rescan(&self, tasks: &mut [Task]) {
        let active = *self.inner.enabled.read()
            && self.inner.sink.currentPermission() == Permission::Granted;
        let mut entries = self.inner.entries.lock();

        if !active {
            for (_, entry) in entries.drain() {
                entry.cancel();
            }
            for t in tasks.iter_mut() {
                t.alertArmed = false;
            }
            return;
        }

        entries.retain(|id, entry| {
            let keep = tasks.iter().any(|t| {
                if &t.id != id {
                    return false;
                }
                match entry {
                    // a title edit invalidates the armed timer too: the
                    // closure captured the old title
                    AlertEntry::Armed { dueAt, title, .. } => {
                        t.dueDate == Some(*dueAt) && t.title == *title
                    }
                    AlertEntry::Fired { dueAt } => t.dueDate == Some(*dueAt),
                }
            });
            if !keep {
                entry.cancel();
                debug!("[NotificationScheduler::rescan] dropped timer for '{}'", id);
            }
            keep
        });

        let nowMs = now();
        for t in tasks.iter_mut() {
            if entries.contains_key(&t.id) {
                t.alertArmed = true;
                continue;
            }
            t.alertArmed = false;
            if let Some(due) = t.dueDate {
                if due > nowMs {
                    let timer = SchedulerInner::armTimer(
                        &self.inner,
                        t.id.clone(),
                        t.title.clone(),
                        due,
                    );
                    entries.insert(
                        t.id.clone(),
                        AlertEntry::Armed {
                            dueAt: due,
                            title: t.title.clone(),
                            timer,
                        },
                    );
                    t.alertArmed = true;
                    debug!(
                        "[NotificationScheduler::rescan] armed '{}' for {}",
                        t.title, due
                    );
                }
            }
        }
    }

    /// Teardown: cancel every outstanding timer. Safe to call more than once;
    /// a scheduler stays cancelled for good.
    pub fn cancelAll(&self) {
        self.inner.shutdown.cancel();
        let mut entries = self.inner.entries.lock();
        for (_, entry) in entries.drain() {
            entry.cancel();
        }
    }
}

impl SchedulerInner {
    fn armTimer(inner: &Arc<Self>, taskId: String, title: String, dueAt: i64) -> JoinHandle<()> {
        let delay = Duration::from_millis((dueAt - now()).max(0) as u64);
        let token = inner.shutdown.clone();
        let inner = Arc::clone(inner);
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(delay) => inner.fireAlert(&taskId, &title),
            }
        })
    }

    fn fireAlert(&self, taskId: &str, title: &str) {
        {
            let mut entries = self.entries.lock();
            if let Some(entry) = entries.get_mut(taskId) {
                let dueAt = entry.dueAt();
                *entry = AlertEntry::Fired { dueAt };
            }
        }

        // permission may have been revoked while the timer slept
        if self.sink.currentPermission() == Permission::Granted {
            self.sink.fire(ALERT_TITLE, title);
        } else {
            debug!(
                "[NotificationScheduler::fire] permission revoked, skipping alert for '{}'",
                title
            );
        }

        let json = {
            let mut alerts = self.alerts.write();
            alerts.insert(0, AlertRecord::new(taskId.to_string(), title.to_string()));
            alerts.truncate(self.alertLogCap);
            serde_json::to_string(&*alerts)
        };
        match json {
            Ok(json) => {
                if let Err(e) = self.store.set(&alertsKey(&self.userKey), &json) {
                    warn!("[NotificationScheduler::fire] alert log write failed: {}", e);
                }
            }
            Err(e) => warn!("[NotificationScheduler::fire] alert log encode failed: {}", e),
        }
    }
}
