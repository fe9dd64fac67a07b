//! Floor-plan command handlers.

use std::io::IsTerminal;
use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use sodo_core::floorplan::SourceKind;
use sodo_core::{DiagramAction, Editor, FloorPlan, FloorPlanImporter, PdftoppmRasterizer};

use crate::cli::{FloorplanArgs, FloorplanCommand};
use crate::config::Context;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Debug, Serialize)]
struct PlanInfo {
    mime: String,
    width: Option<u32>,
    height: Option<u32>,
    #[serde(skip)]
    size: String,
    bytes: usize,
}

impl From<&FloorPlan> for PlanInfo {
    fn from(plan: &FloorPlan) -> Self {
        Self {
            mime: plan.mime.clone(),
            width: plan.dimensions.map(|(w, _)| w),
            height: plan.dimensions.map(|(_, h)| h),
            size: plan.size_label(),
            bytes: plan.data_url.len(),
        }
    }
}

fn spinner(message: String, quiet: bool) -> ProgressBar {
    if quiet || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

async fn import(ctx: &Context, file: &Path) -> Result<FloorPlan, CliError> {
    let importer = FloorPlanImporter::new(
        PdftoppmRasterizer::new(ctx.config.import.pdftoppm.clone()),
        ctx.config.import.pdf_scale,
    );
    let bar = spinner(format!("Processing {}", file.display()), ctx.quiet);
    let result = importer.import_file(file).await;
    bar.finish_and_clear();
    result.map_err(|source| CliError::Import {
        path: file.display().to_string(),
        source,
    })
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    editor: &mut Editor,
    args: FloorplanArgs,
    ctx: &Context,
) -> Result<(), CliError> {
    match args.command {
        FloorplanCommand::Set { file } => {
            util::ensure_writable(editor)?;
            let plan = import(ctx, &file).await?;
            let kind = match plan.source {
                SourceKind::Image => "image",
                SourceKind::Pdf => "PDF page 1",
            };
            output::notice(
                &format!("Loaded {kind} ({})", plan.size_label()),
                ctx.quiet,
            );
            util::dispatch(editor, DiagramAction::SetFloorPlan(Some(plan.data_url)))?;
            Ok(())
        }

        FloorplanCommand::Clear => {
            util::ensure_writable(editor)?;
            if editor.project().floor_plan.is_none() {
                output::notice("No floor plan to clear", ctx.quiet);
                return Ok(());
            }
            util::dispatch(editor, DiagramAction::SetFloorPlan(None))?;
            output::notice("Floor plan removed", ctx.quiet);
            Ok(())
        }

        FloorplanCommand::Info => {
            let project = editor.project();
            let Some(url) = project.floor_plan.as_deref() else {
                output::notice("No floor plan set", ctx.quiet);
                return Ok(());
            };
            let plan = FloorPlan::from_data_url(url).map_err(|source| CliError::Import {
                path: "stored floor plan".into(),
                source,
            })?;
            let info = PlanInfo::from(&plan);
            let out = output::render_single(
                ctx.output,
                &info,
                |i| {
                    format!(
                        "Format: {}\nSize:   {}\nStored: {} bytes",
                        i.mime, i.size, i.bytes
                    )
                },
                |i| i.size.clone(),
            )?;
            output::print_output(&out, ctx.quiet);
            Ok(())
        }
    }
}
