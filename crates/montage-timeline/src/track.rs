//! Track types for the timeline.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An ordered lane on the timeline.
///
/// Track storage order defines both the vertical stacking in the editing
/// surface and the compositing layer order: the LAST track in the sequence
/// is the bottom-most layer (painted first), the FIRST track is the top-most
/// (painted last, over everything else).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Unique track ID
    pub id: Uuid,
    /// Track name
    pub name: String,
    /// Hidden tracks are skipped by the compositor
    pub visible: bool,
    /// Locked tracks refuse edits
    pub locked: bool,
}

impl Track {
    /// Create a new visible, unlocked track.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            visible: true,
            locked: false,
        }
    }

    /// The fixed set of lanes a new project starts with.
    pub fn default_lanes() -> Vec<Track> {
        vec![Track::new("V3"), Track::new("V2"), Track::new("V1")]
    }
}
