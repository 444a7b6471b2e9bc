// Drag-and-drop reorder controller
// Translates begin/drop gesture events into one atomic move on the engine

use parking_lot::Mutex;
use tracing::debug;

use crate::engine::TaskEngine;

/// Tracks the task picked up by the current drag gesture. Dropping on a
/// target reinserts the dragged task at the target's former position; the
/// move participates in undo/redo like any other mutation.
pub struct DragController {
    engine: TaskEngine,
    source: Mutex<Option<String>>,
}

impl DragController {
    pub fn new(engine: TaskEngine) -> Self {
        Self {
            engine,
            source: Mutex::new(None),
        }
    }

    /// A new drag replaces any gesture still in flight
    pub fn beginDrag(&self, taskId: &str) {
        *self.source.lock() = Some(taskId.to_string());
    }

    /// Gesture ended without a drop target
    pub fn cancelDrag(&self) {
        *self.source.lock() = None;
    }

    /// Complete the gesture. Dropping on the dragged task itself, on an
    /// unknown id, or without a drag in flight is a no-op: no snapshot, no
    /// persist. The drag is consumed either way.
    pub fn dropOn(&self, targetId: &str) -> bool {
        let Some(fromId) = self.source.lock().take() else {
            debug!("[DragController::dropOn] no drag in flight, ignoring");
            return false;
        };
        if fromId == targetId {
            return false;
        }
        self.engine.moveTask(&fromId, targetId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EngineConfig;
    use crate::scheduler::{NotificationSink, Permission};
    use crate::storage::{tasksKey, MemoryStore, StoreAdapter};
    use std::sync::Arc;
    use std::time::Duration;

    struct InertSink;

    impl NotificationSink for InertSink {
        fn requestPermission(&self) -> Permission {
            Permission::Denied
        }
        fn currentPermission(&self) -> Permission {
            Permission::Denied
        }
        fn fire(&self, _title: &str, _body: &str) {}
    }

    const USER: &str = "u@example.com";

    fn setup(titles: &[&str]) -> (TaskEngine, DragController, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let config = EngineConfig {
            persistDebounceMs: 40,
            ..EngineConfig::default()
        };
        let engine = TaskEngine::loadWith(config, USER, store.clone(), Arc::new(InertSink));
        // addTask prepends, so feed titles in reverse to get display order
        for title in titles.iter().rev() {
            engine.addTask(title);
        }
        let drag = DragController::new(engine.clone());
        (engine, drag, store)
    }

    fn titles(engine: &TaskEngine) -> Vec<String> {
        engine.tasks().into_iter().map(|t| t.title).collect()
    }

    fn idOf(engine: &TaskEngine, title: &str) -> String {
        engine
            .tasks()
            .into_iter()
            .find(|t| t.title == title)
            .map(|t| t.id)
            .unwrap()
    }

    #[tokio::test]
    async fn test_drop_moves_to_targets_former_position() {
        let (engine, drag, _) = setup(&["a", "b", "c"]);
        // dragging down: a lands after c
        drag.beginDrag(&idOf(&engine, "a"));
        assert!(drag.dropOn(&idOf(&engine, "c")));
        assert_eq!(titles(&engine), vec!["b", "c", "a"]);
        // dragging down again: c lands after a
        drag.beginDrag(&idOf(&engine, "c"));
        assert!(drag.dropOn(&idOf(&engine, "a")));
        assert_eq!(titles(&engine), vec!["b", "a", "c"]);
        engine.close();
    }

    #[tokio::test]
    async fn test_adjacent_swap_roundtrip_restores_order() {
        let (engine, drag, _) = setup(&["x", "a", "b", "y"]);
        drag.beginDrag(&idOf(&engine, "a"));
        drag.dropOn(&idOf(&engine, "b"));
        assert_eq!(titles(&engine), vec!["x", "b", "a", "y"]);
        drag.beginDrag(&idOf(&engine, "b"));
        drag.dropOn(&idOf(&engine, "a"));
        assert_eq!(titles(&engine), vec!["x", "a", "b", "y"]);
        engine.close();
    }

    #[tokio::test]
    async fn test_self_drop_changes_nothing() {
        let (engine, drag, store) = setup(&["a", "b"]);
        tokio::time::sleep(Duration::from_millis(200)).await;
        let persisted = store.get(&tasksKey(USER)).unwrap();
        let before = engine.tasks();

        drag.beginDrag(&idOf(&engine, "a"));
        assert!(!drag.dropOn(&idOf(&engine, "a")));
        assert_eq!(engine.tasks(), before);
        // no persist cycle ran: the stored blob is byte-for-byte untouched
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(store.get(&tasksKey(USER)).unwrap(), persisted);
        engine.close();
    }

    #[tokio::test]
    async fn test_unknown_ids_are_noops() {
        let (engine, drag, _) = setup(&["a"]);
        let before = engine.tasks();
        drag.beginDrag("missing");
        assert!(!drag.dropOn(&idOf(&engine, "a")));
        drag.beginDrag(&idOf(&engine, "a"));
        assert!(!drag.dropOn("missing"));
        assert_eq!(engine.tasks(), before);
        engine.close();
    }

    #[tokio::test]
    async fn test_drop_without_drag_and_consumed_drag() {
        let (engine, drag, _) = setup(&["a", "b"]);
        assert!(!drag.dropOn(&idOf(&engine, "a")));
        drag.beginDrag(&idOf(&engine, "a"));
        assert!(drag.dropOn(&idOf(&engine, "b")));
        // the gesture was consumed by the drop
        assert!(!drag.dropOn(&idOf(&engine, "b")));
        engine.close();
    }

    #[tokio::test]
    async fn test_cancel_drag_clears_gesture() {
        let (engine, drag, _) = setup(&["a", "b"]);
        drag.beginDrag(&idOf(&engine, "a"));
        drag.cancelDrag();
        assert!(!drag.dropOn(&idOf(&engine, "b")));
        assert_eq!(titles(&engine), vec!["a", "b"]);
        engine.close();
    }

    #[tokio::test]
    async fn test_reorder_is_one_undo_step() {
        let (engine, drag, _) = setup(&["a", "b", "c"]);
        let before = engine.tasks();
        drag.beginDrag(&idOf(&engine, "c"));
        drag.dropOn(&idOf(&engine, "a"));
        assert_eq!(titles(&engine), vec!["c", "a", "b"]);
        assert_eq!(engine.undo(), before);
        engine.close();
    }
}
