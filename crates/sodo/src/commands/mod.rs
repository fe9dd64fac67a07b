//! Command dispatch: bridges CLI args -> editor actions -> output formatting.

pub mod bom;
pub mod config_cmd;
pub mod connections;
pub mod devices;
pub mod floorplan;
pub mod project;
pub mod render;
pub mod share;
pub mod util;

use sodo_core::Editor;

use crate::cli::Command;
use crate::config::Context;
use crate::error::CliError;

/// Dispatch a project-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, editor: &mut Editor, ctx: &Context) -> Result<(), CliError> {
    match cmd {
        Command::Project(args) => project::handle(editor, args, ctx),
        Command::Devices(args) => devices::handle(editor, args, ctx),
        Command::Connections(args) => connections::handle(editor, args, ctx),
        Command::Floorplan(args) => floorplan::handle(editor, args, ctx).await,
        Command::Bom => bom::handle(editor, ctx),
        Command::Share => share::handle(editor, ctx),
        Command::Render(args) => render::handle(editor, args, ctx),
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
