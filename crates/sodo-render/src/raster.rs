// ── PNG rasterization ──

use sodo_core::Project;
use thiserror::Error;
use tracing::debug;

use crate::scene::{self, SceneOptions};

/// Pixel density of exported images.
pub const EXPORT_SCALE: f32 = 2.0;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to parse generated SVG: {0}")]
    Svg(#[from] usvg::Error),

    #[error("cannot allocate a {width}x{height} pixmap")]
    Pixmap { width: u32, height: u32 },

    #[error("PNG encoding failed: {0}")]
    Png(String),
}

/// Rasterize an SVG document at `scale`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::as_conversions
)]
pub fn svg_to_pixmap(svg: &str, scale: f32) -> Result<tiny_skia::Pixmap, RenderError> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    let tree = usvg::Tree::from_str(svg, &opt)?;

    let size = tree.size();
    let width = (size.width() * scale).ceil().max(1.0) as u32;
    let height = (size.height() * scale).ceil().max(1.0) as u32;
    let mut pixmap =
        tiny_skia::Pixmap::new(width, height).ok_or(RenderError::Pixmap { width, height })?;
    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    debug!(width, height, scale, "rasterized scene");
    Ok(pixmap)
}

/// PNG bytes of the whole diagram at `scale`.
pub fn render_png(
    project: &Project,
    options: &SceneOptions,
    scale: f32,
) -> Result<Vec<u8>, RenderError> {
    let svg = scene::scene_svg(project, options);
    svg_to_pixmap(&svg, scale)?
        .encode_png()
        .map_err(|e| RenderError::Png(e.to_string()))
}
