//! Text rasterization for title clips.

use ab_glyph::{FontArc, PxScale};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use montage_core::Result;
use montage_timeline::TextStyle;
use tracing::debug;

/// Pixel offset of the drop shadow behind title text.
const SHADOW_OFFSET: i32 = 2;
/// Shadow color, translucent black for a soft edge over any background.
const SHADOW_COLOR: Rgba<u8> = Rgba([0, 0, 0, 160]);
/// Padding around the rendered text block.
const MARGIN: u32 = 4;

/// Rasterizes title strings into RGBA images.
///
/// Holds an optional font: when none could be loaded, text clips degrade to
/// painting nothing rather than failing the render.
pub struct TextRenderer {
    font: Option<FontArc>,
}

impl TextRenderer {
    /// Candidate system font locations, checked in order.
    const SYSTEM_FONTS: &'static [&'static str] = &[
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/Library/Fonts/Arial.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ];

    /// Create a renderer using the first system font that loads.
    pub fn new() -> Self {
        for path in Self::SYSTEM_FONTS {
            if let Ok(bytes) = std::fs::read(path) {
                if let Ok(font) = FontArc::try_from_vec(bytes) {
                    debug!(font = path, "Loaded title font");
                    return Self { font: Some(font) };
                }
            }
        }
        debug!("No title font available; text clips will not render");
        Self { font: None }
    }

    /// Create a renderer from raw font bytes.
    pub fn from_font_bytes(bytes: Vec<u8>) -> Result<Self> {
        let font = FontArc::try_from_vec(bytes).map_err(|e| {
            montage_core::MontageError::InvalidParameter(format!("bad font data: {e}"))
        })?;
        Ok(Self { font: Some(font) })
    }

    /// Create a renderer with no font (text clips render nothing).
    pub fn disabled() -> Self {
        Self { font: None }
    }

    /// Whether a font is loaded.
    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Rasterize a title string with its drop shadow.
    ///
    /// Lines are stacked and centered horizontally. Returns `None` when no
    /// font is loaded or the string is empty.
    pub fn render(&self, style: &TextStyle) -> Option<RgbaImage> {
        let font = self.font.as_ref()?;
        if style.content.trim().is_empty() {
            return None;
        }

        let scale = PxScale::from(style.font_size_px.max(1.0));
        let lines: Vec<&str> = style.content.lines().collect();
        let sizes: Vec<(u32, u32)> = lines.iter().map(|l| text_size(scale, font, l)).collect();

        let line_height = sizes.iter().map(|&(_, h)| h).max().unwrap_or(0);
        let block_width = sizes.iter().map(|&(w, _)| w).max().unwrap_or(0);
        if block_width == 0 || line_height == 0 {
            return None;
        }
        let gap = (line_height as f32 * 0.25) as u32;
        let block_height = line_height * lines.len() as u32 + gap * (lines.len() as u32 - 1);

        let width = block_width + MARGIN * 2 + SHADOW_OFFSET as u32;
        let height = block_height + MARGIN * 2 + SHADOW_OFFSET as u32;
        let mut image = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));

        let fill = Rgba(style.color.to_array());
        for (i, line) in lines.iter().enumerate() {
            let (line_width, _) = sizes[i];
            let x = (MARGIN + (block_width - line_width) / 2) as i32;
            let y = (MARGIN + (line_height + gap) * i as u32) as i32;
            draw_text_mut(
                &mut image,
                SHADOW_COLOR,
                x + SHADOW_OFFSET,
                y + SHADOW_OFFSET,
                scale,
                font,
                line,
            );
            draw_text_mut(&mut image, fill, x, y, scale, font, line);
        }

        Some(image)
    }
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self::new()
    }
}
