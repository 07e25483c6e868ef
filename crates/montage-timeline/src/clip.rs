//! Clip types for the timeline.

use montage_core::{Color, TimeRange};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a clip shows: a registered media asset, or editor-generated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClipSource {
    /// A clip backed by an asset in the registry.
    Media(Uuid),
    /// A text clip; the string lives in the clip's properties.
    Text,
}

/// Styling for a text clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// The string drawn on the canvas
    pub content: String,
    /// Fill color
    pub color: Color,
    /// Font size in canvas pixels
    pub font_size_px: f32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            content: String::new(),
            color: Color::WHITE,
            font_size_px: 48.0,
        }
    }
}

/// Transform and appearance of a clip on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipProperties {
    /// Horizontal center in fractional canvas coordinates (0..1)
    pub position_x: f32,
    /// Vertical center in fractional canvas coordinates (0..1)
    pub position_y: f32,
    /// Uniform scale factor (1.0 = natural size)
    pub scale: f32,
    /// Rotation in degrees
    pub rotation_degrees: f32,
    /// Opacity from 0.0 (transparent) to 1.0 (opaque)
    pub opacity: f32,
    /// Present iff the clip's source is [`ClipSource::Text`]
    pub text: Option<TextStyle>,
}

impl ClipProperties {
    /// Smallest usable scale factor.
    pub const MIN_SCALE: f32 = 0.01;

    /// The same properties with every ranged field forced into bounds.
    pub fn clamped(mut self) -> Self {
        self.position_x = self.position_x.clamp(0.0, 1.0);
        self.position_y = self.position_y.clamp(0.0, 1.0);
        self.scale = self.scale.max(Self::MIN_SCALE);
        self.opacity = self.opacity.clamp(0.0, 1.0);
        self
    }
}

impl Default for ClipProperties {
    fn default() -> Self {
        Self {
            position_x: 0.5,
            position_y: 0.5,
            scale: 1.0,
            rotation_degrees: 0.0,
            opacity: 1.0,
            text: None,
        }
    }
}

/// A placed instance of an asset on a track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    /// Unique clip ID
    pub id: Uuid,
    /// What this clip shows
    pub source: ClipSource,
    /// Track the clip sits on
    pub track_id: Uuid,
    /// Start on the global timeline, seconds
    pub start_time: f64,
    /// Duration on the global timeline, seconds
    pub duration: f64,
    /// Offset into the asset's own timeline at which playback begins
    pub source_offset: f64,
    /// Transform and appearance
    pub properties: ClipProperties,
}

impl Clip {
    /// Create a clip showing a registered asset.
    pub fn new(asset_id: Uuid, track_id: Uuid, start_time: f64, duration: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            source: ClipSource::Media(asset_id),
            track_id,
            start_time,
            duration,
            source_offset: 0.0,
            properties: ClipProperties::default(),
        }
    }

    /// Create a text clip.
    pub fn new_text(track_id: Uuid, start_time: f64, duration: f64, style: TextStyle) -> Self {
        Self {
            id: Uuid::new_v4(),
            source: ClipSource::Text,
            track_id,
            start_time,
            duration,
            source_offset: 0.0,
            properties: ClipProperties {
                text: Some(style),
                ..ClipProperties::default()
            },
        }
    }

    /// End time on the global timeline (exclusive).
    #[inline]
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }

    /// The clip's active interval `[start_time, start_time + duration)`.
    #[inline]
    pub fn active_range(&self) -> TimeRange {
        TimeRange::new(self.start_time, self.duration)
    }

    /// Whether the clip contributes to compositing at `instant`.
    #[inline]
    pub fn is_active_at(&self, instant: f64) -> bool {
        self.active_range().contains(instant)
    }

    /// Position within the asset's own timeline for a global `instant`.
    #[inline]
    pub fn source_time_at(&self, instant: f64) -> f64 {
        self.source_offset + (instant - self.start_time)
    }

    /// End of the clip's window into the source, seconds.
    #[inline]
    pub fn source_end(&self) -> f64 {
        self.source_offset + self.duration
    }

    /// The asset id, for media-backed clips.
    pub fn asset_id(&self) -> Option<Uuid> {
        match self.source {
            ClipSource::Media(id) => Some(id),
            ClipSource::Text => None,
        }
    }
}
