//! Frame sources with seek and readiness semantics.
//!
//! The compositor asks a source to position itself at a source-mapped
//! instant, then polls for readiness. Image sources are always ready; video
//! sources model the seek latency of a real decoder so the interactive path
//! can skip a clip whose source is mid-seek while the export path waits.

use std::collections::HashMap;

use image::RgbaImage;
use montage_core::Result;
use montage_timeline::{AssetKind, AssetRegistry};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::decoder::VideoDecoder;

/// Instants closer than this are the same decoded frame.
const POSITION_EPSILON: f64 = 1.0 / 240.0;

/// A media source that can be positioned on its own timeline.
pub trait FrameSource {
    /// Ask the source to position itself at `seconds` into its own timeline.
    fn request_position(&mut self, seconds: f64);

    /// Poll for readiness. A pending seek advances one step per call.
    fn poll_ready(&mut self) -> bool;

    /// The decoded frame at the requested position, once ready.
    fn frame(&self) -> Option<&RgbaImage>;
}

/// A still image; always ready, ignores positioning.
pub struct ImageSource {
    image: RgbaImage,
}

impl ImageSource {
    /// Decode an image from raw container bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(bytes)
            .map_err(|e| montage_core::MontageError::Decoder(format!("image decode: {e}")))?
            .to_rgba8();
        Ok(Self { image })
    }

    /// Wrap an already-decoded raster.
    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }
}

impl FrameSource for ImageSource {
    fn request_position(&mut self, _seconds: f64) {}

    fn poll_ready(&mut self) -> bool {
        true
    }

    fn frame(&self) -> Option<&RgbaImage> {
        Some(&self.image)
    }
}

/// A video source backed by a decoder, with modeled seek latency.
pub struct VideoSource {
    decoder: VideoDecoder,
    /// Polls remaining before a pending seek completes.
    pending_polls: u32,
    /// Polls a fresh seek takes to settle.
    seek_latency: u32,
    target: Option<f64>,
    decoded: Option<(f64, RgbaImage)>,
}

impl VideoSource {
    /// Default number of polls a seek takes to settle.
    pub const DEFAULT_SEEK_LATENCY: u32 = 2;

    /// Create a source over the given decoder.
    pub fn new(decoder: VideoDecoder) -> Self {
        Self {
            decoder,
            pending_polls: 0,
            seek_latency: Self::DEFAULT_SEEK_LATENCY,
            target: None,
            decoded: None,
        }
    }

    /// Override the modeled seek latency (0 = seeks settle instantly).
    pub fn with_seek_latency(mut self, polls: u32) -> Self {
        self.seek_latency = polls;
        self
    }
}

impl FrameSource for VideoSource {
    fn request_position(&mut self, seconds: f64) {
        // Re-requesting the current position is free; anything else is a seek.
        if let Some((at, _)) = &self.decoded {
            if (at - seconds).abs() < POSITION_EPSILON && self.pending_polls == 0 {
                self.target = Some(seconds);
                return;
            }
        }
        if self.target.is_some_and(|t| (t - seconds).abs() < POSITION_EPSILON) {
            return;
        }
        debug!(seconds, "Video seek requested");
        self.target = Some(seconds);
        self.pending_polls = self.seek_latency;
        if self.seek_latency == 0 {
            self.decoded = Some((seconds, self.decoder.decode_at(seconds)));
        }
    }

    fn poll_ready(&mut self) -> bool {
        let Some(target) = self.target else {
            return self.decoded.is_some();
        };
        if self.pending_polls > 0 {
            self.pending_polls -= 1;
            if self.pending_polls > 0 {
                return false;
            }
            self.decoded = Some((target, self.decoder.decode_at(target)));
        }
        self.decoded
            .as_ref()
            .is_some_and(|(at, _)| (at - target).abs() < POSITION_EPSILON)
    }

    fn frame(&self) -> Option<&RgbaImage> {
        match (&self.decoded, self.target) {
            (Some((at, frame)), Some(target)) if (at - target).abs() < POSITION_EPSILON => {
                Some(frame)
            }
            (Some((_, frame)), None) => Some(frame),
            _ => None,
        }
    }
}

/// Hands the compositor a source for an asset id.
pub trait SourceProvider {
    /// The source for an asset, or `None` when it cannot be resolved.
    fn source_for(&mut self, asset_id: Uuid) -> Option<&mut (dyn FrameSource + 'static)>;
}

/// Lazy cache of frame sources, one per referenced asset.
///
/// Sources are created on first use from the asset registry. Assets whose
/// content cannot be resolved cache the failure so a dangling clip stays
/// cheap to skip.
#[derive(Default)]
pub struct MediaPool {
    sources: HashMap<Uuid, Option<Box<dyn FrameSource>>>,
}

impl MediaPool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pre-built source (tests, generated content).
    pub fn insert(&mut self, asset_id: Uuid, source: Box<dyn FrameSource>) {
        self.sources.insert(asset_id, Some(source));
    }

    /// Resolve the source for an asset, creating it on first use.
    pub fn resolve(&mut self, asset_id: Uuid, registry: &AssetRegistry) -> Option<&mut (dyn FrameSource + 'static)> {
        let entry = self.sources.entry(asset_id).or_insert_with(|| {
            let Some(asset) = registry.get(asset_id) else {
                warn!(asset = %asset_id, "Clip references unknown asset");
                return None;
            };
            match asset.kind {
                AssetKind::Image => match std::fs::read(&asset.source)
                    .map_err(montage_core::MontageError::from)
                    .and_then(|bytes| ImageSource::from_bytes(&bytes))
                {
                    Ok(source) => Some(Box::new(source) as Box<dyn FrameSource>),
                    Err(e) => {
                        warn!(asset = %asset_id, source = %asset.source, error = %e, "Image asset unavailable");
                        None
                    }
                },
                AssetKind::Video => {
                    let duration = asset.natural_duration.unwrap_or(0.0);
                    let decoder = VideoDecoder::open(asset.source.clone(), duration);
                    Some(Box::new(VideoSource::new(decoder)) as Box<dyn FrameSource>)
                }
            }
        });
        entry.as_deref_mut()
    }
}

/// A pool bound to a registry, usable as a [`SourceProvider`].
pub struct BoundPool<'a> {
    pub pool: &'a mut MediaPool,
    pub registry: &'a AssetRegistry,
}

impl SourceProvider for BoundPool<'_> {
    fn source_for(&mut self, asset_id: Uuid) -> Option<&mut (dyn FrameSource + 'static)> {
        self.pool.resolve(asset_id, self.registry)
    }
}
