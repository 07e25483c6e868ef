//! Encoder boundary: raw RGBA frames piped into FFmpeg.
//!
//! The core hands the encoder composited frames in strictly increasing time
//! order and receives the finished container bytes back. Encoding itself is
//! FFmpeg's problem; the default preference is VP9 in WebM.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};

use image::RgbaImage;
use montage_core::{limits::EXPORT_FPS, MontageError, Result};
use tracing::info;
use uuid::Uuid;

/// Output configuration for an export.
#[derive(Debug, Clone)]
pub struct EncoderSettings {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// CRF value (lower = better quality).
    pub crf: u32,
}

impl EncoderSettings {
    /// Web-friendly royalty-free default: VP9 in WebM.
    pub fn vp9_webm(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            fps: EXPORT_FPS,
            crf: 32,
        }
    }

    /// Build the FFmpeg command arguments.
    pub fn ffmpeg_args(&self, output: &std::path::Path) -> Vec<String> {
        let mut args: Vec<String> = Vec::new();

        // Input from pipe (raw frames)
        args.extend_from_slice(&[
            "-y".into(),
            "-f".into(),
            "rawvideo".into(),
            "-pixel_format".into(),
            "rgba".into(),
            "-video_size".into(),
            format!("{}x{}", self.width, self.height),
            "-framerate".into(),
            self.fps.to_string(),
            "-i".into(),
            "pipe:0".into(),
        ]);

        // VP9 in constant-quality mode
        args.extend_from_slice(&[
            "-c:v".into(),
            "libvpx-vp9".into(),
            "-b:v".into(),
            "0".into(),
            "-crf".into(),
            self.crf.to_string(),
            "-pix_fmt".into(),
            "yuv420p".into(),
        ]);

        args.push(output.to_string_lossy().into_owned());
        args
    }
}

/// Sink for composited frames.
///
/// Frames arrive in strictly increasing time order; `finish` flushes the
/// stream and returns the encoded container bytes.
pub trait FrameSink {
    fn write_frame(&mut self, frame: &RgbaImage) -> Result<()>;
    fn finish(&mut self) -> Result<Vec<u8>>;
}

/// FFmpeg-backed sink writing a VP9/WebM file.
pub struct FfmpegEncoder {
    settings: EncoderSettings,
    output_path: PathBuf,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    frames_written: u64,
}

impl FfmpegEncoder {
    /// Spawn FFmpeg ready to accept raw frames.
    pub fn new(settings: EncoderSettings) -> Result<Self> {
        let output_path =
            std::env::temp_dir().join(format!("montage-export-{}.webm", Uuid::new_v4()));
        let args = settings.ffmpeg_args(&output_path);

        let mut child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| MontageError::Encoder(format!("failed to spawn ffmpeg: {e}")))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| MontageError::Encoder("failed to open ffmpeg stdin".into()))?;

        info!(output = %output_path.display(), "Encoder started");
        Ok(Self {
            settings,
            output_path,
            child: Some(child),
            stdin: Some(stdin),
            frames_written: 0,
        })
    }

    /// Frames written so far.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }
}

impl FrameSink for FfmpegEncoder {
    fn write_frame(&mut self, frame: &RgbaImage) -> Result<()> {
        if (frame.width(), frame.height()) != (self.settings.width, self.settings.height) {
            return Err(MontageError::Encoder(format!(
                "frame size {}x{} does not match encoder {}x{}",
                frame.width(),
                frame.height(),
                self.settings.width,
                self.settings.height
            )));
        }
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| MontageError::Encoder("encoder already finalized".into()))?;
        stdin
            .write_all(frame.as_raw())
            .map_err(|e| MontageError::Encoder(format!("failed to write frame: {e}")))?;
        self.frames_written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<Vec<u8>> {
        // Close stdin to signal end-of-stream, then wait for the muxer.
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| MontageError::Encoder("encoder already finalized".into()))?;
        let status = child
            .wait()
            .map_err(|e| MontageError::Encoder(format!("failed to wait for ffmpeg: {e}")))?;
        if !status.success() {
            return Err(MontageError::Encoder(format!(
                "ffmpeg exited with status: {status}"
            )));
        }

        let bytes = std::fs::read(&self.output_path)?;
        let _ = std::fs::remove_file(&self.output_path);
        info!(
            frames = self.frames_written,
            bytes = bytes.len(),
            "Encoder finalized"
        );
        Ok(bytes)
    }
}

impl Drop for FfmpegEncoder {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            drop(self.stdin.take());
            let _ = child.kill();
            let _ = child.wait();
            let _ = std::fs::remove_file(&self.output_path);
        }
    }
}

/// In-memory sink that records every frame (test double for the encoder).
#[derive(Default)]
pub struct FrameCollector {
    pub frames: Vec<RgbaImage>,
}

impl FrameCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames collected.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether no frames have arrived.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl FrameSink for FrameCollector {
    fn write_frame(&mut self, frame: &RgbaImage) -> Result<()> {
        self.frames.push(frame.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<Vec<u8>> {
        Ok(Vec::new())
    }
}
