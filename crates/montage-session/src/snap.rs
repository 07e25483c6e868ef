//! Snap resolution for timeline drags.
//!
//! Candidates are checked against a fixed priority order (the playhead,
//! then every other clip's start, then every other clip's end) and the
//! FIRST target within the pixel threshold wins, not the nearest one.

use montage_timeline::Clip;
use uuid::Uuid;

use crate::gesture::ViewMetrics;

/// Resolve a candidate time against the snap targets.
///
/// `dragged_clip` excludes the clip being dragged from the target set.
/// Returns the snapped time, or the candidate unchanged when nothing is
/// within the threshold.
pub fn resolve(
    candidate: f64,
    dragged_clip: Uuid,
    playhead: f64,
    clips: &[Clip],
    view: &ViewMetrics,
) -> f64 {
    let others = || clips.iter().filter(|c| c.id != dragged_clip);

    let targets = std::iter::once(playhead)
        .chain(others().map(|c| c.start_time))
        .chain(others().map(|c| c.end_time()));

    for target in targets {
        if view.time_to_px(target - candidate).abs() < view.snap_threshold_px {
            return target;
        }
    }
    candidate
}
