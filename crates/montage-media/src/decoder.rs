//! Video decoder producing RGBA frames at arbitrary instants.

use image::{Rgba, RgbaImage};
use tracing::info;

/// Video decoder for a single source.
///
/// Synthesizes deterministic time-coded pattern frames in place of a real
/// decode. A production build would pipe frames out of FFmpeg here; every
/// consumer only sees `RgbaImage`s at requested instants, so the swap is
/// contained to this file.
pub struct VideoDecoder {
    source: String,
    width: u32,
    height: u32,
    duration: f64,
}

impl VideoDecoder {
    /// Default decode resolution for synthesized frames.
    pub const DEFAULT_SIZE: (u32, u32) = (320, 180);

    /// Open a video source for decoding.
    pub fn open(source: impl Into<String>, duration: f64) -> Self {
        let source = source.into();
        info!(source = %source, duration, "Opening video source");
        let (width, height) = Self::DEFAULT_SIZE;
        Self {
            source,
            width,
            height,
            duration,
        }
    }

    /// The source locator this decoder reads from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Frame dimensions.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Source duration in seconds.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Decode the frame at `seconds` into the source's own timeline.
    ///
    /// Out-of-range instants clamp to the first/last frame, matching how a
    /// paused decoder holds its edge frame.
    pub fn decode_at(&self, seconds: f64) -> RgbaImage {
        let t = seconds.clamp(0.0, self.duration.max(0.0));

        // Color bars with a sweeping marker column so each instant is
        // visually and numerically distinct.
        const BARS: [[u8; 3]; 8] = [
            [255, 255, 255],
            [255, 255, 0],
            [0, 255, 255],
            [0, 255, 0],
            [255, 0, 255],
            [255, 0, 0],
            [0, 0, 255],
            [0, 0, 0],
        ];

        let marker_x = if self.duration > 0.0 {
            ((t / self.duration) * (self.width.saturating_sub(1)) as f64).round() as u32
        } else {
            0
        };

        RgbaImage::from_fn(self.width, self.height, |x, y| {
            if x == marker_x {
                return Rgba([255, 128, 0, 255]);
            }
            let bar = (x * 8 / self.width.max(1)).min(7) as usize;
            let [r, g, b] = BARS[bar];
            // Darken the lower third so vertical placement is visible too.
            if y > self.height * 2 / 3 {
                Rgba([r / 2, g / 2, b / 2, 255])
            } else {
                Rgba([r, g, b, 255])
            }
        })
    }
}
