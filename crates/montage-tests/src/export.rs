//! Integration tests for the export scheduler.

use image::{Rgba, RgbaImage};
use montage_compositor::{CanvasSize, Compositor, TextRenderer};
use montage_media::{FrameCollector, ImageSource, VideoDecoder, VideoSource};
use montage_session::{EditorSession, ExportCancel, SeekWait};
use montage_timeline::AssetKind;

const CANVAS: CanvasSize = CanvasSize {
    width: 16,
    height: 16,
};

fn compositor() -> Compositor {
    Compositor::with_text(CANVAS, TextRenderer::disabled())
}

/// Session whose project duration works out to exactly 35 seconds
/// (last clip ends at 30, plus the 5 s tail padding).
fn padded_session() -> EditorSession {
    let mut session = EditorSession::new();
    let asset = session.add_asset(AssetKind::Image, "mem://bg", "Background", None);
    session.insert_source(
        asset,
        Box::new(ImageSource::from_image(RgbaImage::from_pixel(
            2,
            2,
            Rgba([200, 200, 200, 255]),
        ))),
    );
    let lane = session.tracks()[0].id;
    session.add_clip(asset, lane, 0.0, 5.0).unwrap();
    session.add_clip(asset, lane, 25.0, 5.0).unwrap();
    assert_eq!(session.project_duration(), 35.0);
    session
}

#[test]
fn export_produces_exactly_duration_times_fps_frames() {
    let mut session = padded_session();
    let mut sink = FrameCollector::new();
    let outcome = session
        .export(
            &compositor(),
            &mut sink,
            &SeekWait::immediate(),
            &ExportCancel::new(),
            |_| {},
        )
        .unwrap();

    // 35 s at 30 fps, [0, 35): exactly 1050 frames, none skipped or doubled.
    assert_eq!(outcome.frames_written, 1050);
    assert_eq!(sink.len(), 1050);
}

#[test]
fn export_progress_runs_zero_to_one_hundred() {
    let mut session = padded_session();
    let mut sink = FrameCollector::new();
    let mut reports: Vec<u8> = Vec::new();
    session
        .export(
            &compositor(),
            &mut sink,
            &SeekWait::immediate(),
            &ExportCancel::new(),
            |p| reports.push(p),
        )
        .unwrap();

    assert_eq!(reports.len(), 1050);
    assert_eq!(*reports.first().unwrap(), 0);
    assert_eq!(*reports.last().unwrap(), 100);
    assert!(reports.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn export_settles_video_seeks_before_finalizing_frames() {
    let mut session = EditorSession::new();
    let asset = session.add_asset(AssetKind::Video, "media/take.mp4", "Take", Some(20.0));
    session.insert_source(
        asset,
        Box::new(
            VideoSource::new(VideoDecoder::open("media/take.mp4", 20.0)).with_seek_latency(4),
        ),
    );
    let lane = session.tracks()[0].id;
    let clip = session.add_clip(asset, lane, 0.0, 2.0).unwrap();
    let mut props = session.clip(clip).unwrap().properties.clone();
    props.scale = 8.0;
    session.set_clip_properties(clip, props);

    let mut sink = FrameCollector::new();
    session
        .export(
            &compositor(),
            &mut sink,
            &SeekWait::immediate(),
            &ExportCancel::new(),
            |_| {},
        )
        .unwrap();

    // Frames inside the clip's interval carry decoded content despite the
    // modeled seek latency; the interactive path would have skipped them.
    let active_frames = 2 * 30;
    for frame in sink.frames.iter().take(active_frames) {
        assert!(frame.pixels().any(|p| p.0 != [0, 0, 0, 255]));
    }
    // Frames after the clip's end are background only.
    assert!(sink.frames[active_frames]
        .pixels()
        .all(|p| p.0 == [0, 0, 0, 255]));
}

#[test]
fn cancelled_export_leaves_session_usable() {
    let mut session = padded_session();
    let mut sink = FrameCollector::new();
    let cancel = ExportCancel::new();
    cancel.cancel();

    let result = session.export(
        &compositor(),
        &mut sink,
        &SeekWait::immediate(),
        &cancel,
        |_| {},
    );
    assert!(result.is_err());
    assert!(!session.is_exporting());

    // A fresh export on the same session succeeds.
    let mut sink = FrameCollector::new();
    let outcome = session
        .export(
            &compositor(),
            &mut sink,
            &SeekWait::immediate(),
            &ExportCancel::new(),
            |_| {},
        )
        .unwrap();
    assert_eq!(outcome.frames_written, 1050);
}
