//! Montage Session - the interactive editing engine
//!
//! Owns the live (clips, tracks) state and everything that mutates it:
//! - Drag gestures: move, trim-start, trim-end, with snapping and track
//!   retargeting
//! - Split, delete, and property edits
//! - Snapshot history wiring (one gesture = one undo step)
//! - The playback clock for real-time preview
//! - The export scheduler driving the compositor at a fixed frame rate

pub mod export;
pub mod gesture;
pub mod playback;
pub mod session;
pub mod snap;

pub use export::{ExportCancel, ExportOutcome, SeekWait};
pub use gesture::{DragMode, DragSession, ViewMetrics};
pub use playback::PlaybackClock;
pub use session::EditorSession;
