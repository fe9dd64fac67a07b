//! Share-link handler.

use sodo_core::{Editor, codec};

use crate::config::Context;
use crate::error::CliError;
use crate::output;

pub fn handle(editor: &Editor, ctx: &Context) -> Result<(), CliError> {
    let base = ctx.config.share_base_url()?;
    let link = codec::share_link(&base, &editor.project())?;
    output::print_output(link.as_str(), ctx.quiet);
    Ok(())
}
