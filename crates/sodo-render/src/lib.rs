//! Draws a sodo [`Project`](sodo_core::Project) as SVG and rasterizes it to PNG.
//!
//! The SVG scene is the export format; PNG goes through `resvg` at
//! [`EXPORT_SCALE`] pixel density.

mod raster;
mod scene;

pub use raster::{EXPORT_SCALE, RenderError, render_png, svg_to_pixmap};
pub use scene::{CanvasSize, SceneOptions, canvas_size, scene_svg, status_color};
