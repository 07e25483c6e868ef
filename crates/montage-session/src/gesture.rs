//! Drag gesture state and the trim/move arithmetic.
//!
//! A gesture captures the clip's committed values once at press time and
//! threads them through every pointer-move update, so updates never depend
//! on intermediate state. History is untouched until the gesture ends.

use montage_core::limits::MIN_CLIP_DURATION;
use montage_timeline::Clip;
use uuid::Uuid;

/// What a drag does to its clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    /// Reposition the clip on the timeline (and possibly another track).
    Move,
    /// Slide the clip's start while keeping its end fixed.
    TrimStart,
    /// Adjust the clip's duration from the end.
    TrimEnd,
}

/// Fixed time-to-pixel mapping of the editing surface.
#[derive(Debug, Clone, Copy)]
pub struct ViewMetrics {
    /// Horizontal scale of the timeline lanes.
    pub pixels_per_second: f32,
    /// Vertical extent of one track lane row.
    pub track_row_height: f32,
    /// Snap radius in pixels.
    pub snap_threshold_px: f32,
}

impl Default for ViewMetrics {
    fn default() -> Self {
        Self {
            pixels_per_second: 100.0,
            track_row_height: 64.0,
            snap_threshold_px: 10.0,
        }
    }
}

impl ViewMetrics {
    /// Convert a horizontal pixel delta to seconds.
    #[inline]
    pub fn px_to_time(&self, px: f32) -> f64 {
        (px / self.pixels_per_second) as f64
    }

    /// Convert a time delta to horizontal pixels.
    #[inline]
    pub fn time_to_px(&self, seconds: f64) -> f32 {
        seconds as f32 * self.pixels_per_second
    }

    /// Track lane row index under a vertical offset, if any.
    pub fn lane_at(&self, y: f32, lane_count: usize) -> Option<usize> {
        if y < 0.0 {
            return None;
        }
        let lane = (y / self.track_row_height).floor() as usize;
        (lane < lane_count).then_some(lane)
    }
}

/// Per-gesture context captured at press time.
#[derive(Debug, Clone)]
pub struct DragSession {
    pub mode: DragMode,
    pub clip_id: Uuid,
    pub pointer_origin_x: f32,
    pub original_start: f64,
    pub original_duration: f64,
    pub original_source_offset: f64,
    pub original_track: Uuid,
}

impl DragSession {
    /// Capture a gesture from the clip's current committed values.
    pub fn begin(clip: &Clip, mode: DragMode, pointer_x: f32) -> Self {
        Self {
            mode,
            clip_id: clip.id,
            pointer_origin_x: pointer_x,
            original_start: clip.start_time,
            original_duration: clip.duration,
            original_source_offset: clip.source_offset,
            original_track: clip.track_id,
        }
    }

    /// Seconds the pointer has travelled since press.
    #[inline]
    pub fn time_delta(&self, pointer_x: f32, view: &ViewMetrics) -> f64 {
        view.px_to_time(pointer_x - self.pointer_origin_x)
    }

    /// Unsnapped candidate start for a move gesture.
    pub fn move_candidate(&self, pointer_x: f32, view: &ViewMetrics) -> f64 {
        (self.original_start + self.time_delta(pointer_x, view)).max(0.0)
    }

    /// Unsnapped candidate start for a trim-start gesture, clamped so the
    /// clip keeps at least the minimum duration and never starts before 0.
    pub fn trim_start_candidate(&self, pointer_x: f32, view: &ViewMetrics) -> f64 {
        let latest =
            (self.original_start + self.original_duration - MIN_CLIP_DURATION).max(0.0);
        (self.original_start + self.time_delta(pointer_x, view)).clamp(0.0, latest)
    }

    /// Restore the captured values onto the clip (gesture cancel).
    pub fn restore(&self, clip: &mut Clip) {
        clip.start_time = self.original_start;
        clip.duration = self.original_duration;
        clip.source_offset = self.original_source_offset;
        clip.track_id = self.original_track;
    }
}

/// Apply a snapped move position.
pub fn apply_move(clip: &mut Clip, snapped_start: f64) {
    clip.start_time = snapped_start.max(0.0);
}

/// Apply a snapped trim-start position.
///
/// The delta is applied symmetrically: the duration shrinks by what the
/// start gained and the source offset advances by the same amount, keeping
/// the clip's end time and on-screen content anchored.
pub fn apply_trim_start(clip: &mut Clip, drag: &DragSession, snapped_start: f64) {
    let latest = (drag.original_start + drag.original_duration - MIN_CLIP_DURATION).max(0.0);
    let new_start = snapped_start.clamp(0.0, latest);
    let time_delta = new_start - drag.original_start;
    clip.start_time = new_start;
    clip.duration = drag.original_duration - time_delta;
    clip.source_offset = drag.original_source_offset + time_delta;
}

/// Apply a trim-end delta, clamped to the source window when known.
///
/// `natural_limit` is the asset's natural duration for video clips and
/// `None` for images or not-yet-probed sources.
pub fn apply_trim_end(clip: &mut Clip, drag: &DragSession, delta: f64, natural_limit: Option<f64>) {
    let mut duration = (drag.original_duration + delta).max(MIN_CLIP_DURATION);
    if let Some(limit) = natural_limit {
        let available = (limit - drag.original_source_offset).max(MIN_CLIP_DURATION);
        duration = duration.min(available);
    }
    clip.duration = duration;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_clip(start: f64, duration: f64, offset: f64) -> Clip {
        let mut clip = Clip::new(Uuid::new_v4(), Uuid::new_v4(), start, duration);
        clip.source_offset = offset;
        clip
    }

    #[test]
    fn test_move_candidate_scales_by_view() {
        let clip = make_clip(2.0, 5.0, 0.0);
        let drag = DragSession::begin(&clip, DragMode::Move, 300.0);
        let view = ViewMetrics::default();
        // 150 px right at 100 px/s = +1.5 s
        assert_eq!(drag.move_candidate(450.0, &view), 3.5);
        // Far left clamps at zero
        assert_eq!(drag.move_candidate(0.0, &view), 0.0);
    }

    #[test]
    fn test_trim_start_preserves_end_time() {
        let mut clip = make_clip(2.0, 5.0, 1.0);
        let drag = DragSession::begin(&clip, DragMode::TrimStart, 0.0);
        let end_before = clip.end_time();

        apply_trim_start(&mut clip, &drag, 3.5);
        assert_eq!(clip.start_time, 3.5);
        assert_eq!(clip.end_time(), end_before);
        assert_eq!(clip.source_offset, 2.5);
    }

    #[test]
    fn test_trim_start_clamps_to_min_duration() {
        let mut clip = make_clip(2.0, 5.0, 0.0);
        let drag = DragSession::begin(&clip, DragMode::TrimStart, 0.0);

        // Way past the clip's end: start stops at end - MIN_CLIP_DURATION.
        apply_trim_start(&mut clip, &drag, 100.0);
        assert!((clip.start_time - (7.0 - MIN_CLIP_DURATION)).abs() < 1e-9);
        assert!((clip.duration - MIN_CLIP_DURATION).abs() < 1e-9);
        assert_eq!(clip.end_time(), 7.0);
    }

    #[test]
    fn test_trim_end_keeps_start() {
        let mut clip = make_clip(2.0, 5.0, 0.0);
        let drag = DragSession::begin(&clip, DragMode::TrimEnd, 0.0);

        apply_trim_end(&mut clip, &drag, 2.0, None);
        assert_eq!(clip.start_time, 2.0);
        assert_eq!(clip.duration, 7.0);

        apply_trim_end(&mut clip, &drag, -10.0, None);
        assert_eq!(clip.duration, MIN_CLIP_DURATION);
    }

    #[test]
    fn test_trim_end_respects_source_window() {
        let mut clip = make_clip(0.0, 4.0, 3.0);
        let drag = DragSession::begin(&clip, DragMode::TrimEnd, 0.0);

        // Source is 8 s long with 3 s already consumed by the offset.
        apply_trim_end(&mut clip, &drag, 10.0, Some(8.0));
        assert_eq!(clip.duration, 5.0);
        assert_eq!(clip.source_end(), 8.0);
    }

    #[test]
    fn test_restore_undoes_live_mutation() {
        let mut clip = make_clip(2.0, 5.0, 1.0);
        let drag = DragSession::begin(&clip, DragMode::Move, 0.0);
        apply_move(&mut clip, 9.0);
        clip.track_id = Uuid::new_v4();

        drag.restore(&mut clip);
        assert_eq!(clip.start_time, 2.0);
        assert_eq!(clip.track_id, drag.original_track);
    }

    #[test]
    fn test_lane_lookup() {
        let view = ViewMetrics::default();
        assert_eq!(view.lane_at(10.0, 3), Some(0));
        assert_eq!(view.lane_at(70.0, 3), Some(1));
        assert_eq!(view.lane_at(500.0, 3), None);
        assert_eq!(view.lane_at(-5.0, 3), None);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn trim_start_never_moves_end(
                start in 0.0f64..100.0,
                duration in 0.2f64..50.0,
                offset in 0.0f64..20.0,
                target in -50.0f64..200.0,
            ) {
                let mut clip = make_clip(start, duration, offset);
                let drag = DragSession::begin(&clip, DragMode::TrimStart, 0.0);
                apply_trim_start(&mut clip, &drag, target);

                prop_assert!((clip.end_time() - (start + duration)).abs() < 1e-9);
                prop_assert!(clip.duration >= MIN_CLIP_DURATION - 1e-9);
                prop_assert!(clip.start_time >= 0.0);
            }

            #[test]
            fn trim_end_never_moves_start(
                start in 0.0f64..100.0,
                duration in 0.2f64..50.0,
                delta in -100.0f64..100.0,
            ) {
                let mut clip = make_clip(start, duration, 0.0);
                let drag = DragSession::begin(&clip, DragMode::TrimEnd, 0.0);
                apply_trim_end(&mut clip, &drag, delta, None);

                prop_assert_eq!(clip.start_time, start);
                prop_assert!(clip.duration >= MIN_CLIP_DURATION - 1e-9);
            }

            #[test]
            fn trim_end_clamp_respects_source_window(
                duration in 0.2f64..10.0,
                offset in 0.0f64..5.0,
                delta in 0.0f64..50.0,
                natural in 6.0f64..30.0,
            ) {
                let mut clip = make_clip(0.0, duration, offset);
                let drag = DragSession::begin(&clip, DragMode::TrimEnd, 0.0);
                apply_trim_end(&mut clip, &drag, delta, Some(natural));

                prop_assert!(clip.source_end() <= natural + 1e-9);
            }
        }
    }
}
