//! Image export handler.

use std::path::PathBuf;

use sodo_core::{Editor, codec};
use sodo_render::{SceneOptions, render_png, scene_svg};

use crate::cli::RenderArgs;
use crate::config::Context;
use crate::error::CliError;
use crate::output;

use super::util;

pub fn handle(editor: &Editor, args: RenderArgs, ctx: &Context) -> Result<(), CliError> {
    if !(args.scale.is_finite() && args.scale > 0.0 && args.scale <= 8.0) {
        return Err(CliError::Validation {
            field: "scale".into(),
            reason: format!("expected a value in (0, 8], got {}", args.scale),
        });
    }
    let project = editor.project();
    let selected = args
        .highlight
        .as_deref()
        .map(|d| util::resolve_device(&project, d).map(|d| d.id.clone()))
        .transpose()?;
    let options = SceneOptions {
        selected,
        show_labels: !args.no_labels,
        show_coverage: !args.no_coverage,
    };

    let (bytes, default_name) = if args.svg {
        let png = codec::image_file_name(&project);
        let name = format!("{}.svg", png.trim_end_matches(".png"));
        (scene_svg(&project, &options).into_bytes(), name)
    } else {
        (
            render_png(&project, &options, args.scale)?,
            codec::image_file_name(&project),
        )
    };
    let path = args.file.unwrap_or_else(|| PathBuf::from(default_name));
    std::fs::write(&path, bytes)?;
    output::notice(&format!("Wrote {}", path.display()), ctx.quiet);
    Ok(())
}
