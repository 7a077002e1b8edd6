//! Bounded undo/redo history.

use std::collections::VecDeque;

use crate::constants::HISTORY_CAPACITY;

/// Snapshot history holding at most `capacity` snapshots, the current one
/// included.
///
/// Recording beyond capacity evicts the oldest snapshot. Recording after an
/// undo discards the redo branch.
#[derive(Debug, Clone)]
pub struct History<T> {
    past: VecDeque<T>,
    present: T,
    future: Vec<T>,
    capacity: usize,
}

impl<T> History<T> {
    /// Creates a history holding up to `HISTORY_CAPACITY` snapshots.
    pub fn new(initial: T) -> Self {
        Self::with_capacity(initial, HISTORY_CAPACITY)
    }

    /// Creates a history holding up to `capacity` snapshots (at least one).
    pub fn with_capacity(initial: T, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        History {
            past: VecDeque::with_capacity(capacity - 1),
            present: initial,
            future: Vec::new(),
            capacity,
        }
    }

    /// The current snapshot.
    pub fn current(&self) -> &T {
        &self.present
    }

    /// Makes `next` the current snapshot.
    pub fn record(&mut self, next: T) {
        let previous = std::mem::replace(&mut self.present, next);
        self.past.push_back(previous);
        while self.past.len() >= self.capacity {
            self.past.pop_front();
        }
        self.future.clear();
    }

    /// Steps back one snapshot. Returns the new current snapshot.
    pub fn undo(&mut self) -> Option<&T> {
        let previous = self.past.pop_back()?;
        let current = std::mem::replace(&mut self.present, previous);
        self.future.push(current);
        Some(&self.present)
    }

    /// Re-applies the most recently undone snapshot.
    pub fn redo(&mut self) -> Option<&T> {
        let next = self.future.pop()?;
        let current = std::mem::replace(&mut self.present, next);
        self.past.push_back(current);
        Some(&self.present)
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Number of snapshots available to undo.
    pub fn undo_depth(&self) -> usize {
        self.past.len()
    }
}
