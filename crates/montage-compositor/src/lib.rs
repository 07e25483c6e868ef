//! Montage Compositor - pure CPU frame compositing
//!
//! Composites the timeline model at a single instant into an RGBA raster:
//! tracks painted bottom layer to top, clips placed by their transform
//! properties, text rasterized with a drop shadow. The compositor holds no
//! timeline state; it is a query over its arguments, driven by both the
//! interactive preview and the export scheduler.

pub mod compositor;
pub mod text;

pub use compositor::{CanvasSize, Compositor};
pub use text::TextRenderer;
