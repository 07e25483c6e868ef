//! Montage - headless demo session
//!
//! Builds a small project (a background image, a video clip, a title),
//! simulates a couple of editing gestures, and exports the result through
//! FFmpeg when it is available.

use anyhow::Result;
use image::{Rgba, RgbaImage};
use montage_compositor::{CanvasSize, Compositor};
use montage_media::{EncoderSettings, FfmpegEncoder, FrameCollector, ImageSource};
use montage_session::{DragMode, EditorSession, ExportCancel, SeekWait};
use montage_timeline::{AssetKind, TextStyle};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Montage demo starting");
    montage_media::init();

    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "montage-demo.webm".into());

    let canvas = CanvasSize::default();
    let compositor = Compositor::new(canvas);
    let mut session = EditorSession::new();

    // A synthetic background image asset.
    let backdrop = session.add_asset(AssetKind::Image, "mem://backdrop", "Backdrop", None);
    session.insert_source(backdrop, Box::new(ImageSource::from_image(gradient(320, 180))));

    // A video asset; the probe callback fills in its duration.
    let video = session.add_asset(AssetKind::Video, "media/demo.mp4", "Demo take", None);
    session.set_asset_duration(video, 12.0);

    // Assemble the timeline: backdrop under video under a title.
    let lanes: Vec<_> = session.tracks().iter().map(|t| t.id).collect();
    let backdrop_clip = session.add_clip(backdrop, lanes[2], 0.0, 10.0)?;
    session.add_clip(video, lanes[1], 1.0, 6.0)?;
    session.add_text_clip(
        lanes[0],
        0.5,
        4.0,
        TextStyle {
            content: "Montage".into(),
            ..TextStyle::default()
        },
    )?;

    // Nudge the backdrop right by half a second, with snapping live.
    session.begin_drag(backdrop_clip, DragMode::Move, 0.0);
    session.update_drag(50.0, 200.0);
    session.end_drag();
    info!(
        start = session.clip(backdrop_clip).unwrap().start_time,
        "Backdrop repositioned"
    );

    // Split the video under the playhead, then take the edit back.
    session.scrub(4.0);
    session.split_at_playhead();
    session.undo();

    let duration = session.project_duration();
    info!(duration, clips = session.clips().len(), "Exporting project");

    let cancel = ExportCancel::new();
    let wait = SeekWait::default();
    let progress = |percent: u8| {
        if percent % 10 == 0 {
            info!(percent, "Export progress");
        }
    };

    match FfmpegEncoder::new(EncoderSettings::vp9_webm(canvas.width, canvas.height)) {
        Ok(mut encoder) => {
            let outcome = session.export(&compositor, &mut encoder, &wait, &cancel, progress)?;
            std::fs::write(&output_path, &outcome.data)?;
            info!(
                frames = outcome.frames_written,
                bytes = outcome.data.len(),
                output = %output_path,
                "Export written"
            );
        }
        Err(e) => {
            warn!(error = %e, "FFmpeg unavailable; counting frames only");
            let mut sink = FrameCollector::new();
            let outcome = session.export(&compositor, &mut sink, &wait, &cancel, progress)?;
            info!(frames = outcome.frames_written, "Export finished without encoder");
        }
    }

    Ok(())
}

/// Diagonal color gradient used as the demo backdrop.
fn gradient(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        let r = (x * 255 / width.max(1)) as u8;
        let b = (y * 255 / height.max(1)) as u8;
        Rgba([r, 40, b, 255])
    })
}
