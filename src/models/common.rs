// Common types and helpers for the Listful engine
// All fields use camelCase for consistency across Rust, TypeScript and stored JSON

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

/// Sidebar list views (all / pending / completed)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    All,
    Pending,
    Completed,
}

/// Get current timestamp in milliseconds
pub fn now() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate new UUID
pub fn newId() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"high\"");
        assert_eq!(
            serde_json::from_str::<Priority>("\"normal\"").unwrap(),
            Priority::Normal
        );
    }

    #[test]
    fn test_new_id_is_unique() {
        assert_ne!(newId(), newId());
    }
}
