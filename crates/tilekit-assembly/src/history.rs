//! Bounded undo/redo stacks of whole-state snapshots.

use std::collections::VecDeque;

use tilekit_core::constants::DEFAULT_HISTORY_DEPTH;

/// Undo/redo stacks holding snapshots of some state `T`.
///
/// The undo stack never exceeds `max_depth`; the oldest entry is dropped on
/// overflow. The redo stack is only fed by [`History::undo`].
#[derive(Debug, Clone)]
pub struct History<T> {
    undo_stack: VecDeque<T>,
    redo_stack: Vec<T>,
    max_depth: usize,
}

impl<T> History<T> {
    pub fn new() -> Self {
        Self::with_depth(DEFAULT_HISTORY_DEPTH)
    }

    /// A depth of zero is raised to one.
    pub fn with_depth(max_depth: usize) -> Self {
        let max_depth = max_depth.max(1);
        Self {
            undo_stack: VecDeque::with_capacity(max_depth),
            redo_stack: Vec::new(),
            max_depth,
        }
    }

    /// Records the state as it was before a new mutation. Clears redo.
    pub fn record(&mut self, snapshot: T) {
        self.redo_stack.clear();
        self.push_undo(snapshot);
    }

    /// Pops the most recent undo snapshot, parking `current` on the redo
    /// stack. Returns `None` (and drops `current`) when there is nothing to
    /// undo.
    pub fn undo(&mut self, current: T) -> Option<T> {
        let previous = self.undo_stack.pop_back()?;
        self.redo_stack.push(current);
        Some(previous)
    }

    /// Pops the most recent redo snapshot, parking `current` on the undo
    /// stack. The rest of the redo stack is kept so several undos can be
    /// redone in a row.
    pub fn redo(&mut self, current: T) -> Option<T> {
        let next = self.redo_stack.pop()?;
        self.push_undo(current);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Changes the bound, evicting the oldest entries if needed.
    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth.max(1);
        self.trim();
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    fn push_undo(&mut self, snapshot: T) {
        self.undo_stack.push_back(snapshot);
        self.trim();
    }

    fn trim(&mut self) {
        while self.undo_stack.len() > self.max_depth {
            self.undo_stack.pop_front();
        }
    }
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::new()
    }
}
