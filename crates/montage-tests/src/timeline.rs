//! Integration tests for the editing session and history.
//!
//! Exercises cross-crate interactions between montage-core,
//! montage-timeline, and montage-session.

use montage_core::limits::{HISTORY_CAPACITY, MIN_CLIP_DURATION};
use montage_session::{DragMode, EditorSession};
use montage_timeline::{AssetKind, ClipProperties};

// ── Helpers ────────────────────────────────────────────────────

/// Session with a probed 10 s video asset and one clip at [2, 7) on the
/// top lane.
fn build_session() -> (EditorSession, uuid::Uuid) {
    let mut session = EditorSession::new();
    let asset = session.add_asset(AssetKind::Video, "media/take.mp4", "Take", None);
    session.set_asset_duration(asset, 10.0);
    let lane = session.tracks()[0].id;
    let clip = session.add_clip(asset, lane, 2.0, 5.0).unwrap();
    (session, clip)
}

// ── Asset boundary ─────────────────────────────────────────────

#[test]
fn probe_callback_fills_duration_once() {
    let mut session = EditorSession::new();
    let asset = session.add_asset(AssetKind::Video, "media/a.mp4", "A", None);
    assert_eq!(session.asset(asset).unwrap().natural_duration, None);

    session.set_asset_duration(asset, 8.0);
    session.set_asset_duration(asset, 44.0); // conflicting probe ignored
    assert_eq!(session.asset(asset).unwrap().natural_duration, Some(8.0));
}

// ── Gesture → history granularity ──────────────────────────────

#[test]
fn full_gesture_round_trip_is_one_undo_step() {
    let (mut session, clip) = build_session();

    session.begin_drag(clip, DragMode::Move, 100.0);
    session.update_drag(150.0, 10.0);
    session.update_drag(220.0, 10.0);
    session.update_drag(300.0, 10.0);
    session.end_drag();
    assert_eq!(session.clip(clip).unwrap().start_time, 4.0);

    // One undo takes the whole gesture back, not one pointer-move.
    assert!(session.undo());
    assert_eq!(session.clip(clip).unwrap().start_time, 2.0);
    assert!(session.redo());
    assert_eq!(session.clip(clip).unwrap().start_time, 4.0);
}

#[test]
fn trim_gestures_preserve_their_anchors() {
    let (mut session, clip) = build_session();

    session.begin_drag(clip, DragMode::TrimStart, 0.0);
    session.update_drag(80.0, 10.0);
    session.end_drag();
    let after_start_trim = session.clip(clip).unwrap().clone();
    assert_eq!(after_start_trim.end_time(), 7.0);
    assert!((after_start_trim.source_offset - 0.8).abs() < 1e-6);

    session.begin_drag(clip, DragMode::TrimEnd, 0.0);
    session.update_drag(-100.0, 10.0);
    session.end_drag();
    let after_end_trim = session.clip(clip).unwrap();
    assert_eq!(after_end_trim.start_time, after_start_trim.start_time);
    assert_eq!(after_end_trim.end_time(), 6.0);
}

#[test]
fn trim_floor_is_never_rejected() {
    let (mut session, clip) = build_session();

    // Drag the end far to the left of the start: clamped, not an error.
    session.begin_drag(clip, DragMode::TrimEnd, 0.0);
    session.update_drag(-10_000.0, 10.0);
    session.end_drag();
    assert_eq!(session.clip(clip).unwrap().duration, MIN_CLIP_DURATION);
}

// ── Split ──────────────────────────────────────────────────────

#[test]
fn split_then_undo_restores_single_clip() {
    let (mut session, clip) = build_session();
    session.scrub(4.5);
    session.split_at_playhead();
    assert_eq!(session.clips().len(), 2);

    session.undo();
    assert_eq!(session.clips().len(), 1);
    assert_eq!(session.clip(clip).unwrap().duration, 5.0);
}

#[test]
fn split_halves_play_back_to_back() {
    let (mut session, left_id) = build_session();
    session.scrub(3.0);
    session.split_at_playhead();

    let left = session.clip(left_id).unwrap();
    let right = session.clip(session.selection().unwrap()).unwrap();
    // No instant is covered by both halves; every instant of the original
    // interval is covered by exactly one.
    assert!(left.is_active_at(2.999));
    assert!(!left.is_active_at(3.0));
    assert!(right.is_active_at(3.0));
    assert!(right.is_active_at(6.999));
    assert!(!right.is_active_at(7.0));
}

// ── History bounds ─────────────────────────────────────────────

#[test]
fn history_is_bounded_under_sustained_editing() {
    let (mut session, clip) = build_session();
    for i in 0..(HISTORY_CAPACITY * 2) {
        session.set_clip_properties(
            clip,
            ClipProperties {
                opacity: (i % 10) as f32 / 10.0,
                ..ClipProperties::default()
            },
        );
    }

    let mut undo_steps = 0;
    while session.undo() {
        undo_steps += 1;
    }
    // Cursor can walk back through at most capacity-1 transitions.
    assert_eq!(undo_steps, HISTORY_CAPACITY - 1);
}

#[test]
fn editing_after_undo_branches_linearly() {
    let (mut session, clip) = build_session();
    session.set_clip_properties(
        clip,
        ClipProperties {
            opacity: 0.25,
            ..ClipProperties::default()
        },
    );
    session.undo();

    // A fresh edit discards the redo branch.
    session.set_clip_properties(
        clip,
        ClipProperties {
            opacity: 0.75,
            ..ClipProperties::default()
        },
    );
    assert!(!session.can_redo());
    assert_eq!(session.clip(clip).unwrap().properties.opacity, 0.75);

    session.undo();
    assert_eq!(session.clip(clip).unwrap().properties.opacity, 1.0);
}
