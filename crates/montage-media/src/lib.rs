//! Montage Media - media source and encoder boundaries
//!
//! This crate handles:
//! - Frame sources with seek/readiness semantics for images and video
//! - Placeholder video decoding (time-coded pattern frames)
//! - Media file probing
//! - The encoder boundary: raw RGBA frames piped into FFmpeg

pub mod decoder;
pub mod encoder;
pub mod probe;
pub mod source;

pub use decoder::VideoDecoder;
pub use encoder::{EncoderSettings, FfmpegEncoder, FrameCollector, FrameSink};
pub use probe::{probe_media, MediaInfo};
pub use source::{FrameSource, ImageSource, MediaPool, SourceProvider, VideoSource};

/// Initialize the media subsystem (call once at startup).
pub fn init() {
    tracing::info!("Montage media initialized");
}
