// Alert history record - one entry per fired due-date notification

use serde::{Deserialize, Serialize};

use super::common::{newId, now};

/// A fired due-date alert, appended newest-first to the per-user alert log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub id: String,
    pub taskId: String,
    pub title: String,
    pub firedAt: i64,
}

impl AlertRecord {
    pub fn new(taskId: String, title: String) -> Self {
        Self {
            id: newId(),
            taskId,
            title,
            firedAt: now(),
        }
    }
}
