// Allow non-snake_case names for JSON serialization compatibility with the web frontend
#![allow(non_snake_case)]

// Listful local task-list engine: per-user task collection with multi-step
// undo/redo, debounced write-through persistence, drag reordering and
// timer-scheduled due-date alerts. The surrounding app (auth, routing, views)
// talks to this crate through TaskEngine and the two capability traits.

pub mod engine;
pub mod history;
pub mod logging;
pub mod models;
pub mod reorder;
pub mod scheduler;
pub mod storage;

pub use engine::TaskEngine;
pub use history::HistoryStack;
pub use logging::initLogging;
pub use models::{AlertRecord, EngineConfig, Filter, Priority, Subtask, Task};
pub use reorder::DragController;
pub use scheduler::{NotificationScheduler, NotificationSink, Permission, ALERT_TITLE};
pub use storage::{alertsKey, notifKey, tasksKey, FileStore, MemoryStore, StoreAdapter};
