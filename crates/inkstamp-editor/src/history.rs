//! Per-page undo/redo history.
//!
//! Each entry is a full snapshot of a page's placement list. Snapshots are
//! cheap: placements are small and share their source artwork.

use crate::placement::Placement;
use inkstamp_core::constants::DEFAULT_HISTORY_DEPTH;
use std::collections::VecDeque;

/// What a snapshot registration changed, so it can be rolled back when a
/// gesture is cancelled.
#[derive(Debug, Clone, Default)]
pub struct SnapshotToken {
    pushed: bool,
    evicted: Option<Vec<Placement>>,
    cleared_redo: VecDeque<Vec<Placement>>,
}

impl SnapshotToken {
    /// True when the registration added an entry to the undo stack.
    pub fn pushed(&self) -> bool {
        self.pushed
    }
}

/// Bounded undo/redo stacks of placement-list snapshots.
#[derive(Debug, Clone)]
pub struct PlacementHistory {
    undo_stack: VecDeque<Vec<Placement>>,
    redo_stack: VecDeque<Vec<Placement>>,
    max_depth: usize,
}

impl Default for PlacementHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_DEPTH)
    }
}

impl PlacementHistory {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Records the state before a discrete action.
    ///
    /// Skips the push when `current` equals the top of the undo stack. The redo
    /// stack is cleared either way.
    pub fn register_snapshot(&mut self, current: &[Placement]) -> SnapshotToken {
        let cleared_redo = std::mem::take(&mut self.redo_stack);

        if self.undo_stack.back().is_some_and(|top| top.as_slice() == current) {
            return SnapshotToken {
                pushed: false,
                evicted: None,
                cleared_redo,
            };
        }

        self.undo_stack.push_back(current.to_vec());
        let evicted = if self.undo_stack.len() > self.max_depth {
            self.undo_stack.pop_front()
        } else {
            None
        };

        SnapshotToken {
            pushed: true,
            evicted,
            cleared_redo,
        }
    }

    /// Rolls back a registration made by [`register_snapshot`](Self::register_snapshot).
    ///
    /// Only valid while no other history operation happened in between.
    pub fn revert_snapshot(&mut self, token: SnapshotToken) {
        if token.pushed {
            self.undo_stack.pop_back();
            if let Some(evicted) = token.evicted {
                self.undo_stack.push_front(evicted);
            }
        }
        self.redo_stack = token.cleared_redo;
    }

    /// Steps back. Returns the list that becomes current, `None` when there
    /// is nothing to undo.
    pub fn undo(&mut self, current: &[Placement]) -> Option<Vec<Placement>> {
        let previous = self.undo_stack.pop_back()?;
        Self::push_bounded(&mut self.redo_stack, current.to_vec(), self.max_depth);
        Some(previous)
    }

    /// Steps forward. Returns the list that becomes current, `None` when
    /// there is nothing to redo.
    pub fn redo(&mut self, current: &[Placement]) -> Option<Vec<Placement>> {
        let next = self.redo_stack.pop_back()?;
        Self::push_bounded(&mut self.undo_stack, current.to_vec(), self.max_depth);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    fn push_bounded(stack: &mut VecDeque<Vec<Placement>>, entry: Vec<Placement>, max: usize) {
        stack.push_back(entry);
        while stack.len() > max {
            stack.pop_front();
        }
    }
}
