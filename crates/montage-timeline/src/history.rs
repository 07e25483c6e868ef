//! Snapshot history with bounded undo/redo.
//!
//! Stores full-state snapshots rather than diffs: projects are small, and
//! the capacity bound keeps memory flat. The history is an owned value
//! inside the editing session with an explicit capacity and cursor.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clip::Clip;
use crate::track::Track;

/// An immutable capture of the full (clips, tracks) state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub clips: Vec<Clip>,
    pub tracks: Vec<Track>,
}

impl Snapshot {
    /// Capture the given live state.
    pub fn capture(clips: &[Clip], tracks: &[Track]) -> Self {
        Self {
            clips: clips.to_vec(),
            tracks: tracks.to_vec(),
        }
    }
}

/// Linear undo/redo stack over full-state snapshots.
///
/// The cursor always points at the snapshot matching live state. Committing
/// while the cursor is not at the end discards every later snapshot, so
/// history stays linear.
#[derive(Debug, Clone)]
pub struct History {
    snapshots: Vec<Snapshot>,
    cursor: usize,
    capacity: usize,
}

impl History {
    /// Create a history seeded with the initial state.
    pub fn new(capacity: usize, initial: Snapshot) -> Self {
        Self {
            snapshots: vec![initial],
            cursor: 0,
            capacity: capacity.max(1),
        }
    }

    /// Append a snapshot of the given state.
    ///
    /// Truncates any redo entries first, then evicts the oldest snapshot if
    /// the capacity is exceeded, and leaves the cursor on the new entry.
    pub fn commit(&mut self, clips: &[Clip], tracks: &[Track]) {
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push(Snapshot::capture(clips, tracks));
        if self.snapshots.len() > self.capacity {
            self.snapshots.remove(0);
        }
        self.cursor = self.snapshots.len() - 1;
        debug!(entries = self.snapshots.len(), cursor = self.cursor, "Committed snapshot");
    }

    /// Step back one snapshot. No-op at the first entry.
    ///
    /// The caller applies the returned snapshot as the new live state; the
    /// history never mutates live state itself.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(&self.snapshots[self.cursor])
    }

    /// Step forward one snapshot. No-op at the last entry.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        if self.cursor + 1 >= self.snapshots.len() {
            return None;
        }
        self.cursor += 1;
        Some(&self.snapshots[self.cursor])
    }

    /// Check if undo is available.
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Check if redo is available.
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    /// Number of stored snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Whether only the initial snapshot remains.
    pub fn is_empty(&self) -> bool {
        self.snapshots.len() <= 1
    }

    /// Current cursor position.
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}
