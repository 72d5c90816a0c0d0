//! Bounded undo/redo history of full snapshots.
//!
//! Every committed edit pushes the snapshot it replaced. Undo hands back the
//! most recent one and keeps the current snapshot for redo. Any new push
//! discards the redo side entirely.

use std::collections::VecDeque;

/// Default number of undoable steps.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

#[derive(Debug, Clone)]
pub struct History<T: Clone> {
    past: VecDeque<T>,
    future: Vec<T>,
    limit: usize,
}

impl<T: Clone> Default for History<T> {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl<T: Clone> History<T> {
    pub fn new(limit: usize) -> Self {
        Self {
            past: VecDeque::with_capacity(limit.min(DEFAULT_HISTORY_LIMIT)),
            future: Vec::new(),
            limit,
        }
    }

    /// Record `snapshot` as the state before a new edit.
    pub fn push(&mut self, snapshot: &T) {
        self.past.push_back(snapshot.clone());
        while self.past.len() > self.limit {
            self.past.pop_front();
        }
        self.future.clear();
    }

    /// Step back from `current`. `None` when there is nothing to undo; the
    /// history is then left untouched.
    pub fn undo(&mut self, current: &T) -> Option<T> {
        let previous = self.past.pop_back()?;
        self.future.push(current.clone());
        Some(previous)
    }

    /// Step forward from `current`. Symmetric to `undo`.
    pub fn redo(&mut self, current: &T) -> Option<T> {
        let next = self.future.pop()?;
        self.past.push_back(current.clone());
        while self.past.len() > self.limit {
            self.past.pop_front();
        }
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Number of undoable steps.
    pub fn len(&self) -> usize {
        self.past.len()
    }

    pub fn is_empty(&self) -> bool {
        self.past.is_empty()
    }

    pub fn redo_len(&self) -> usize {
        self.future.len()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undo_redo_is_lifo() {
        let mut h = History::new(50);
        h.push(&1);
        h.push(&2);
        // Current is 3 after two edits.
        assert_eq!(h.undo(&3), Some(2));
        assert_eq!(h.undo(&2), Some(1));
        assert_eq!(h.redo(&1), Some(2));
        assert_eq!(h.redo(&2), Some(3));
        assert_eq!(h.redo(&3), None);
    }

    #[test]
    fn empty_undo_changes_nothing() {
        let mut h: History<i32> = History::default();
        assert_eq!(h.undo(&7), None);
        assert!(!h.can_redo());
        assert!(h.is_empty());
    }

    #[test]
    fn push_after_undo_discards_redo() {
        let mut h = History::new(50);
        h.push(&1);
        h.push(&2);
        h.undo(&3);
        assert!(h.can_redo());
        h.push(&2);
        assert!(!h.can_redo());
        assert_eq!(h.redo(&9), None);
    }

    #[test]
    fn oldest_entries_are_evicted() {
        let mut h = History::new(50);
        for i in 0..60 {
            h.push(&i);
        }
        assert_eq!(h.len(), 50);
        let mut current = 60;
        let mut undone = Vec::new();
        while let Some(prev) = h.undo(&current) {
            undone.push(prev);
            current = prev;
        }
        assert_eq!(undone.len(), 50);
        assert_eq!(undone.last(), Some(&10));
    }

    #[test]
    fn redo_respects_limit() {
        let mut h = History::new(2);
        h.push(&1);
        h.push(&2);
        assert_eq!(h.undo(&3), Some(2));
        h.redo(&2);
        assert_eq!(h.len(), 2);
        assert_eq!(h.limit(), 2);
    }
}
