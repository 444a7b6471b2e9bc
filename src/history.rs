// Bounded undo/redo history of task collection snapshots
// Every entry is a full value copy - mutating the live collection never
// touches an already-pushed snapshot

use crate::models::Task;

/// Pair of bounded snapshot stacks, newest entry first.
///
/// `push` records a pre-mutation snapshot and discards the redo side
/// (divergent history). `undoSwap`/`redoSwap` pop one side and park the
/// current collection on the opposite side, both truncated to capacity.
#[derive(Debug)]
pub struct HistoryStack {
    cap: usize,
    undo: Vec<Vec<Task>>,
    redo: Vec<Vec<Task>>,
}

impl HistoryStack {
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            undo: Vec::new(),
            redo: Vec::new(),
        }
    }

    /// Record the pre-mutation state of a user edit
    pub fn push(&mut self, snapshot: Vec<Task>) {
        self.undo.insert(0, snapshot);
        self.undo.truncate(self.cap);
        self.redo.clear();
    }

    /// Pop the most recent undo snapshot, parking `current` on the redo side
    pub fn undoSwap(&mut self, current: Vec<Task>) -> Option<Vec<Task>> {
        if self.undo.is_empty() {
            return None;
        }
        let prev = self.undo.remove(0);
        self.redo.insert(0, current);
        self.redo.truncate(self.cap);
        Some(prev)
    }

    /// Pop the most recent redo snapshot, parking `current` on the undo side
    pub fn redoSwap(&mut self, current: Vec<Task>) -> Option<Vec<Task>> {
        if self.redo.is_empty() {
            return None;
        }
        let next = self.redo.remove(0);
        self.undo.insert(0, current);
        self.undo.truncate(self.cap);
        Some(next)
    }

    pub fn undoLen(&self) -> usize {
        self.undo.len()
    }

    pub fn redoLen(&self) -> usize {
        self.redo.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(titles: &[&str]) -> Vec<Task> {
        titles.iter().map(|t| Task::new(t.to_string())).collect()
    }

    #[test]
    fn test_push_clears_redo() {
        let mut h = HistoryStack::new(50);
        h.push(snap(&["a"]));
        let restored = h.undoSwap(snap(&["a", "b"])).unwrap();
        assert_eq!(restored.len(), 1);
        assert_eq!(h.redoLen(), 1);
        h.push(snap(&["c"]));
        assert_eq!(h.redoLen(), 0);
        assert!(h.redoSwap(snap(&[])).is_none());
    }

    #[test]
    fn test_undo_then_redo_roundtrip() {
        let mut h = HistoryStack::new(50);
        let before = snap(&["a"]);
        let after = snap(&["a", "b"]);
        h.push(before.clone());
        let restored = h.undoSwap(after.clone()).unwrap();
        assert_eq!(restored, before);
        let replayed = h.redoSwap(restored).unwrap();
        assert_eq!(replayed, after);
    }

    #[test]
    fn test_both_stacks_respect_capacity() {
        let mut h = HistoryStack::new(3);
        for i in 0..10 {
            h.push(snap(&[&format!("v{}", i)]));
        }
        assert_eq!(h.undoLen(), 3);
        // newest first: v9 on top
        assert_eq!(h.undoSwap(snap(&[])).unwrap()[0].title, "v9");

        // overfill the redo side via repeated undo of pushed states
        let mut h = HistoryStack::new(3);
        for i in 0..6 {
            h.push(snap(&[&format!("v{}", i)]));
        }
        for _ in 0..3 {
            h.undoSwap(snap(&["cur"])).unwrap();
        }
        assert_eq!(h.redoLen(), 3);
    }

    #[test]
    fn test_snapshots_are_independent_copies() {
        let mut h = HistoryStack::new(50);
        let mut live = snap(&["a"]);
        live[0].labels.push("home".to_string());
        h.push(live.clone());
        // mutate the live collection after the push
        live[0].labels.push("urgent".to_string());
        live[0].subtasks.push(crate::models::Subtask::new("step".to_string()));
        let restored = h.undoSwap(live).unwrap();
        assert_eq!(restored[0].labels, vec!["home".to_string()]);
        assert!(restored[0].subtasks.is_empty());
    }

    #[test]
    fn test_empty_stacks_are_noops() {
        let mut h = HistoryStack::new(50);
        assert!(h.undoSwap(snap(&["x"])).is_none());
        assert!(h.redoSwap(snap(&["x"])).is_none());
        // a failed undo must not have parked anything on the redo side
        assert_eq!(h.redoLen(), 0);
        assert_eq!(h.undoLen(), 0);
    }
}
