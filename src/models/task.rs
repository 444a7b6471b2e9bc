// Task model for the Listful engine
// UUID for stable ID, newest-first ordering lives in the collection, not the record

use serde::{Deserialize, Serialize};

use super::common::{newId, now, Priority};

/// A single checklist item inside a task. Independent completion state, no nesting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub done: bool,
}

impl Subtask {
    pub fn new(title: String) -> Self {
        Self {
            id: newId(),
            title,
            done: false,
        }
    }
}

/// Full task record as persisted in the per-user tasks blob
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String, // UUID - stable identifier
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub priority: Priority,
    /// Due instant in epoch millis; future values are eligible for a scheduled alert
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dueDate: Option<i64>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    pub createdAt: i64,
    /// Session-scoped marker: a due-date timer exists for this task.
    /// Never persisted - every load starts unarmed.
    #[serde(skip)]
    pub alertArmed: bool,
}

impl Task {
    pub fn new(title: String) -> Self {
        Self {
            id: newId(),
            title,
            description: None,
            done: false,
            priority: Priority::Normal,
            dueDate: None,
            labels: Vec::new(),
            subtasks: Vec::new(),
            createdAt: now(),
            alertArmed: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_task_defaults() {
        let t = Task::new("Buy milk".to_string());
        assert!(!t.done);
        assert_eq!(t.priority, Priority::Normal);
        assert!(t.dueDate.is_none());
        assert!(t.labels.is_empty());
        assert!(t.subtasks.is_empty());
        assert!(!t.alertArmed);
    }

    #[test]
    fn test_alert_armed_never_persisted() {
        let mut t = Task::new("Call mom".to_string());
        t.alertArmed = true;
        let json = serde_json::to_string(&t).unwrap();
        assert!(!json.contains("alertArmed"));
        let back: Task = serde_json::from_str(&json).unwrap();
        assert!(!back.alertArmed);
    }

    #[test]
    fn test_deserializes_minimal_record() {
        // records written by older clients carry only id/title/createdAt
        let t: Task =
            serde_json::from_str(r#"{"id":"abc","title":"Old","createdAt":1}"#).unwrap();
        assert_eq!(t.priority, Priority::Normal);
        assert!(t.subtasks.is_empty());
    }
}
