//! Montage Timeline - Timeline data model
//!
//! Implements the timeline structure for video editing:
//! - Assets and the project-level asset registry
//! - Tracks and clips placed on the global timeline
//! - Snapshot history with bounded undo/redo

pub mod asset;
pub mod clip;
pub mod history;
pub mod track;

pub use asset::{Asset, AssetKind, AssetRegistry};
pub use clip::{Clip, ClipProperties, ClipSource, TextStyle};
pub use history::{History, Snapshot};
pub use track::Track;
