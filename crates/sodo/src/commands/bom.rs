//! Bill-of-materials handler.

use sodo_core::report::EMPTY_BOM_LABEL;
use sodo_core::{BomLine, Editor, compute_bom};
use tabled::Tabled;

use crate::config::Context;
use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct BomRow {
    #[tabled(rename = "Type")]
    category: String,
    #[tabled(rename = "Count")]
    count: usize,
}

impl From<&BomLine> for BomRow {
    fn from(line: &BomLine) -> Self {
        Self {
            category: line.category.label().into(),
            count: line.count,
        }
    }
}

pub fn handle(editor: &Editor, ctx: &Context) -> Result<(), CliError> {
    let lines = compute_bom(&editor.project());
    if lines.is_empty() && ctx.output == OutputFormat::Table {
        output::print_output(EMPTY_BOM_LABEL, ctx.quiet);
        return Ok(());
    }
    let out = output::render_list(
        ctx.output,
        &lines,
        |l| BomRow::from(l),
        |l| format!("{}\t{}", l.category.slug(), l.count),
    )?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}
