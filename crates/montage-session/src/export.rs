//! Export scheduler: batch-drives the compositor at a fixed frame rate.
//!
//! Frames are produced in strictly increasing time order across
//! `[0, project_duration)` and handed to the encoder one by one. Video
//! sources are asked to seek ahead of each frame and the scheduler waits
//! (bounded) for them to settle, so export output is frame-exact where
//! interactive preview is best-effort.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use montage_compositor::Compositor;
use montage_core::{limits::EXPORT_FPS, MontageError, Result};
use montage_media::{source::BoundPool, FrameSink, MediaPool};
use montage_timeline::{AssetKind, AssetRegistry, Clip, ClipSource, Track};
use tracing::{debug, info, warn};

/// Bounded wait for video sources to settle before a frame is finalized.
///
/// Polling stands in for a true seek-completion signal from the decoding
/// collaborator; `FrameSource::poll_ready` is the seam where such a signal
/// would attach.
#[derive(Debug, Clone)]
pub struct SeekWait {
    /// Maximum readiness polls per source per frame.
    pub max_polls: u32,
    /// Pause between polls.
    pub poll_interval: Duration,
}

impl Default for SeekWait {
    fn default() -> Self {
        Self {
            max_polls: 8,
            poll_interval: Duration::from_millis(5),
        }
    }
}

impl SeekWait {
    /// Poll without sleeping (deterministic tests).
    pub fn immediate() -> Self {
        Self {
            max_polls: 8,
            poll_interval: Duration::ZERO,
        }
    }

    fn pause(&self) {
        if !self.poll_interval.is_zero() {
            std::thread::sleep(self.poll_interval);
        }
    }
}

/// Handle for cancelling an in-progress export between frames.
#[derive(Debug, Clone, Default)]
pub struct ExportCancel(Arc<AtomicBool>);

impl ExportCancel {
    /// Create a new cancel handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Check if cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Result of a completed export.
#[derive(Debug)]
pub struct ExportOutcome {
    /// Encoded container bytes from the sink.
    pub data: Vec<u8>,
    /// Frames handed to the sink.
    pub frames_written: u64,
}

/// Drive the compositor across the project and stream frames to the sink.
///
/// Selection is never drawn here: the caller composites for export. The
/// progress callback receives whole percentages.
#[allow(clippy::too_many_arguments)]
pub fn run(
    tracks: &[Track],
    clips: &[Clip],
    assets: &AssetRegistry,
    pool: &mut MediaPool,
    compositor: &Compositor,
    sink: &mut dyn FrameSink,
    project_duration: f64,
    wait: &SeekWait,
    cancel: &ExportCancel,
    mut on_progress: impl FnMut(u8),
) -> Result<ExportOutcome> {
    if project_duration <= 0.0 {
        return Err(MontageError::InvalidParameter(
            "project duration must be positive".into(),
        ));
    }

    info!(duration = project_duration, fps = EXPORT_FPS, "Export started");
    let mut frames_written: u64 = 0;

    let mut frame = 0u64;
    loop {
        let instant = frame as f64 / EXPORT_FPS as f64;
        if instant >= project_duration {
            break;
        }
        if cancel.is_cancelled() {
            warn!(frame, "Export cancelled");
            return Err(MontageError::Encoder("export cancelled".into()));
        }

        on_progress((instant / project_duration * 100.0).round() as u8);
        settle_video_sources(tracks, clips, assets, pool, instant, wait);

        let raster = compositor.render(
            tracks,
            clips,
            assets,
            &mut BoundPool {
                pool: &mut *pool,
                registry: assets,
            },
            instant,
            None,
        );
        sink.write_frame(&raster)?;
        frames_written += 1;
        frame += 1;
    }

    let data = sink.finish()?;
    info!(frames = frames_written, bytes = data.len(), "Export finished");
    Ok(ExportOutcome {
        data,
        frames_written,
    })
}

/// Ask every active video source to seek, then wait (bounded) for each.
///
/// A source that never settles is skipped for this frame rather than
/// aborting the export; a stuck frame beats a dead multi-minute render.
fn settle_video_sources(
    tracks: &[Track],
    clips: &[Clip],
    assets: &AssetRegistry,
    pool: &mut MediaPool,
    instant: f64,
    wait: &SeekWait,
) {
    for track in tracks.iter().filter(|t| t.visible) {
        for clip in clips
            .iter()
            .filter(|c| c.track_id == track.id && c.is_active_at(instant))
        {
            let ClipSource::Media(asset_id) = clip.source else {
                continue;
            };
            if assets.get(asset_id).map(|a| a.kind) != Some(AssetKind::Video) {
                continue;
            }
            let Some(source) = pool.resolve(asset_id, assets) else {
                continue;
            };
            source.request_position(clip.source_time_at(instant));

            let mut polls = 0;
            while !source.poll_ready() {
                polls += 1;
                if polls >= wait.max_polls {
                    warn!(clip = %clip.id, instant, "Video source did not settle; proceeding");
                    break;
                }
                wait.pause();
            }
            debug!(clip = %clip.id, instant, polls, "Video source settled");
        }
    }
}
