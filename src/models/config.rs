// Engine tunables
// Defaults match the shipped client; tests shrink the debounce window

use serde::{Deserialize, Serialize};

/// Knobs for the task engine. The defaults are what the app ships with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Quiescence window for the write-through persist, in milliseconds
    pub persistDebounceMs: u64,
    /// Max entries kept on each of the undo and redo stacks
    pub historyCap: usize,
    /// Max entries kept in the persisted alert log
    pub alertLogCap: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            persistDebounceMs: 120,
            historyCap: 50,
            alertLogCap: 200,
        }
    }
}
