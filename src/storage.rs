// Durable store adapter for the Listful engine
// Key-value get/set of JSON blobs, keyed per user identity

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

// ============================================
// KEY HELPERS
// ============================================

/// Storage key for a user's task collection
pub fn tasksKey(userKey: &str) -> String {
    format!("tasks_{}", userKey)
}

/// Storage key for a user's alert history
pub fn alertsKey(userKey: &str) -> String {
    format!("alerts_{}", userKey)
}

/// Storage key for a user's notifications-enabled flag
pub fn notifKey(userKey: &str) -> String {
    format!("notif_enabled_{}", userKey)
}

// ============================================
// ADAPTER
// ============================================

/// Capability handed to the engine for durable reads and writes.
///
/// Every value is a JSON-encoded string; callers treat malformed JSON on
/// read the same as an absent key. The record for a given user key is
/// single-writer: a second session writing the same key overwrites without
/// merge.
pub trait StoreAdapter: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), String>;
}

// ============================================
// IN-MEMORY STORE
// ============================================

/// HashMap-backed store for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StoreAdapter for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), String> {
        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ============================================
// FILE STORE
// ============================================

/// One file per key under a root directory (~/.listful by default)
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Default store location (~/.listful/)
    pub fn defaultDir() -> Result<PathBuf, String> {
        let home = dirs::home_dir().ok_or("Failed to get home directory")?;
        Ok(home.join(".listful"))
    }

    fn keyPath(&self, key: &str) -> PathBuf {
        // keys come from the key helpers above; user identities may carry
        // '@' or '.' which are fine as filename characters, but path
        // separators are not
        let safe: String = key
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect();
        self.root.join(format!("{}.json", safe))
    }
}

impl StoreAdapter for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.keyPath(key)).ok()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), String> {
        fs::create_dir_all(&self.root).map_err(|e| e.to_string())?;
        fs::write(self.keyPath(key), value).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_scoped_per_user() {
        assert_eq!(tasksKey("a@b.c"), "tasks_a@b.c");
        assert_eq!(alertsKey("a@b.c"), "alerts_a@b.c");
        assert_eq!(notifKey("a@b.c"), "notif_enabled_a@b.c");
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.get("tasks_x").is_none());
        store.set("tasks_x", "[1,2]").unwrap();
        assert_eq!(store.get("tasks_x").as_deref(), Some("[1,2]"));
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());
        assert!(store.get("tasks_u@example.com").is_none());
        store.set("tasks_u@example.com", "[]").unwrap();
        assert_eq!(store.get("tasks_u@example.com").as_deref(), Some("[]"));
    }

    #[test]
    fn test_file_store_rejects_path_escape() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());
        store.set("tasks_../evil", "{}").unwrap();
        // the separator was flattened, the write stayed inside root
        assert!(store.get("tasks_../evil").is_some());
        assert!(!dir.path().parent().unwrap().join("evil.json").exists());
    }
}
