//! Frame compositing: timeline state at an instant into an RGBA raster.

use glam::{Affine2, Vec2};
use image::{imageops::overlay, Rgba, RgbaImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::geometric_transformations::{warp_into, Interpolation, Projection};
use imageproc::rect::Rect;
use montage_media::SourceProvider;
use montage_timeline::{AssetRegistry, Clip, ClipSource, Track};
use tracing::trace;
use uuid::Uuid;

use crate::text::TextRenderer;

/// Output raster dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// Color of the selection outline drawn in interactive previews.
const SELECTION_COLOR: Rgba<u8> = Rgba([80, 160, 255, 255]);

/// Composites the timeline at a single instant.
///
/// Pure query over (tracks, clips, assets, sources, instant): tracks are
/// painted from the bottom compositing layer (last in storage order) to the
/// top; within one track, simultaneously active clips paint in clip-list
/// insertion order, the documented tie-break for overlaps.
pub struct Compositor {
    canvas: CanvasSize,
    text: TextRenderer,
}

impl Compositor {
    /// Create a compositor with the default text renderer.
    pub fn new(canvas: CanvasSize) -> Self {
        Self {
            canvas,
            text: TextRenderer::new(),
        }
    }

    /// Create a compositor with a specific text renderer.
    pub fn with_text(canvas: CanvasSize, text: TextRenderer) -> Self {
        Self { canvas, text }
    }

    /// Output dimensions.
    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    /// Composite one frame.
    ///
    /// `selection` draws an outline over that clip's bounds in interactive
    /// previews; export always passes `None`. A video source that cannot
    /// supply its frame synchronously contributes nothing to this query.
    pub fn render(
        &self,
        tracks: &[Track],
        clips: &[Clip],
        assets: &AssetRegistry,
        sources: &mut dyn SourceProvider,
        instant: f64,
        selection: Option<Uuid>,
    ) -> RgbaImage {
        let mut canvas = RgbaImage::from_pixel(
            self.canvas.width,
            self.canvas.height,
            Rgba([0, 0, 0, 255]),
        );
        let mut selected_bounds: Option<Rect> = None;

        // Last track in storage order is the bottom compositing layer.
        for track in tracks.iter().rev() {
            if !track.visible {
                continue;
            }
            for clip in clips.iter().filter(|c| c.track_id == track.id) {
                if !clip.is_active_at(instant) {
                    continue;
                }
                if let Some(bounds) = self.paint_clip(&mut canvas, clip, assets, sources, instant)
                {
                    if selection == Some(clip.id) {
                        selected_bounds = Some(bounds);
                    }
                }
            }
        }

        if let Some(bounds) = selected_bounds {
            draw_selection_outline(&mut canvas, bounds);
        }

        canvas
    }

    /// Paint a single clip onto the canvas. Returns the painted bounds, or
    /// `None` when the clip contributed nothing (degrade cases).
    fn paint_clip(
        &self,
        canvas: &mut RgbaImage,
        clip: &Clip,
        assets: &AssetRegistry,
        sources: &mut dyn SourceProvider,
        instant: f64,
    ) -> Option<Rect> {
        let props = &clip.properties;
        if props.opacity <= 0.0 {
            return None;
        }

        let content: std::borrow::Cow<'_, RgbaImage> = match clip.source {
            ClipSource::Text => {
                let style = props.text.as_ref()?;
                std::borrow::Cow::Owned(self.text.render(style)?)
            }
            ClipSource::Media(asset_id) => {
                // Dangling asset id: render nothing for this clip.
                assets.get(asset_id)?;
                let source = sources.source_for(asset_id)?;
                source.request_position(clip.source_time_at(instant));
                if !source.poll_ready() {
                    trace!(clip = %clip.id, "Source not ready; skipping clip this frame");
                    return None;
                }
                std::borrow::Cow::Owned(source.frame()?.clone())
            }
        };

        let (w, h) = (content.width() as f32, content.height() as f32);
        if w <= 0.0 || h <= 0.0 {
            return None;
        }

        let cx = props.position_x * self.canvas.width as f32;
        let cy = props.position_y * self.canvas.height as f32;
        let scale = props.scale.max(0.01);
        let theta = props.rotation_degrees.to_radians();

        // Content centered at the origin, scaled, rotated, then translated
        // to the clip's canvas position.
        let projection = Projection::translate(cx, cy)
            * Projection::rotate(theta)
            * Projection::scale(scale, scale)
            * Projection::translate(-w * 0.5, -h * 0.5);

        let mut layer = RgbaImage::from_pixel(
            self.canvas.width,
            self.canvas.height,
            Rgba([0, 0, 0, 0]),
        );
        warp_into(
            content.as_ref(),
            &projection,
            Interpolation::Bilinear,
            Rgba([0, 0, 0, 0]),
            &mut layer,
        );

        if props.opacity < 1.0 {
            apply_opacity(&mut layer, props.opacity);
        }
        overlay(canvas, &layer, 0, 0);

        Some(placement_bounds(
            Vec2::new(w, h),
            Vec2::new(cx, cy),
            scale,
            theta,
            self.canvas,
        ))
    }
}

/// Scale every alpha value by `opacity`.
fn apply_opacity(image: &mut RgbaImage, opacity: f32) {
    let opacity = opacity.clamp(0.0, 1.0);
    for pixel in image.pixels_mut() {
        pixel.0[3] = (pixel.0[3] as f32 * opacity).round() as u8;
    }
}

/// Axis-aligned bounds of the transformed content, clamped to the canvas.
fn placement_bounds(
    content: Vec2,
    center: Vec2,
    scale: f32,
    theta: f32,
    canvas: CanvasSize,
) -> Rect {
    let transform = Affine2::from_scale_angle_translation(Vec2::splat(scale), theta, center)
        * Affine2::from_translation(-content * 0.5);
    let corners = [
        Vec2::ZERO,
        Vec2::new(content.x, 0.0),
        Vec2::new(0.0, content.y),
        content,
    ]
    .map(|corner| transform.transform_point2(corner));

    let min_x = corners.iter().map(|c| c.x).fold(f32::INFINITY, f32::min);
    let min_y = corners.iter().map(|c| c.y).fold(f32::INFINITY, f32::min);
    let max_x = corners.iter().map(|c| c.x).fold(f32::NEG_INFINITY, f32::max);
    let max_y = corners.iter().map(|c| c.y).fold(f32::NEG_INFINITY, f32::max);

    let x0 = (min_x.max(0.0) as i32).min(canvas.width as i32 - 1);
    let y0 = (min_y.max(0.0) as i32).min(canvas.height as i32 - 1);
    let x1 = (max_x.min(canvas.width as f32) as i32).max(x0 + 1);
    let y1 = (max_y.min(canvas.height as f32) as i32).max(y0 + 1);
    Rect::at(x0, y0).of_size((x1 - x0) as u32, (y1 - y0) as u32)
}

/// Two nested hollow rectangles give the outline a 2px weight.
fn draw_selection_outline(canvas: &mut RgbaImage, bounds: Rect) {
    draw_hollow_rect_mut(canvas, bounds, SELECTION_COLOR);
    if bounds.width() > 2 && bounds.height() > 2 {
        let inner = Rect::at(bounds.left() + 1, bounds.top() + 1)
            .of_size(bounds.width() - 2, bounds.height() - 2);
        draw_hollow_rect_mut(canvas, inner, SELECTION_COLOR);
    }
}
