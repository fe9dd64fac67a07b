//! Project command handlers.

use std::path::{Path, PathBuf};

use serde::Serialize;
use sodo_core::{DiagramAction, Editor, FloorPlan, Project, ProjectOrigin, codec};

use crate::cli::{ProjectArgs, ProjectCommand};
use crate::config::Context;
use crate::error::CliError;
use crate::output;

use super::util;

/// Project overview for `project show`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Summary {
    name: String,
    origin: &'static str,
    read_only: bool,
    devices: usize,
    connections: usize,
    floor_plan: Option<String>,
    last_updated: String,
}

fn origin_label(origin: ProjectOrigin) -> &'static str {
    match origin {
        ProjectOrigin::Persisted => "saved",
        ProjectOrigin::Default => "new",
        ProjectOrigin::Shared => "shared",
    }
}

fn summarize(editor: &Editor) -> Summary {
    let project = editor.project();
    let floor_plan = project.floor_plan.as_deref().map(|url| {
        FloorPlan::from_data_url(url).map_or_else(
            |_| "unreadable".to_owned(),
            |plan| format!("{} {}", plan.mime, plan.size_label()),
        )
    });
    Summary {
        name: project.name.clone(),
        origin: origin_label(editor.origin()),
        read_only: editor.is_read_only(),
        devices: project.devices.len(),
        connections: project.connections.len(),
        floor_plan,
        last_updated: project.last_updated.to_rfc3339(),
    }
}

fn detail(s: &Summary, color: bool) -> String {
    let mut lines = vec![
        output::heading(&s.name, color),
        format!("Source:      {}", s.origin),
        format!("Devices:     {}", s.devices),
        format!("Connections: {}", s.connections),
        format!("Floor plan:  {}", s.floor_plan.as_deref().unwrap_or("-")),
        format!("Updated:     {}", s.last_updated),
    ];
    if s.read_only {
        lines.push("Read-only:   yes (opened from a share link)".into());
    }
    lines.join("\n")
}

fn write_export(project: &Project, file: Option<PathBuf>, quiet: bool) -> Result<(), CliError> {
    let json = codec::encode_pretty(project)?;
    let path = file.unwrap_or_else(|| PathBuf::from(codec::export_file_name(project)));
    if path == Path::new("-") {
        output::print_output(&json, false);
        return Ok(());
    }
    std::fs::write(&path, json)?;
    output::notice(&format!("Exported to {}", path.display()), quiet);
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(editor: &mut Editor, args: ProjectArgs, ctx: &Context) -> Result<(), CliError> {
    match args.command {
        ProjectCommand::Show => {
            let summary = summarize(editor);
            let out = output::render_single(
                ctx.output,
                &summary,
                |s| detail(s, ctx.color),
                |s| s.name.clone(),
            )?;
            output::print_output(&out, ctx.quiet);
            Ok(())
        }

        ProjectCommand::Rename { name } => {
            util::ensure_writable(editor)?;
            if name.trim().is_empty() {
                return Err(CliError::Validation {
                    field: "name".into(),
                    reason: "project name cannot be empty".into(),
                });
            }
            let outcome = util::dispatch(editor, DiagramAction::RenameProject(name.clone()))?;
            if outcome.committed {
                output::notice(&format!("Project renamed to '{name}'"), ctx.quiet);
            }
            Ok(())
        }

        ProjectCommand::Reset => {
            util::ensure_writable(editor)?;
            if !util::confirm(
                "Remove every device, connection and the floor plan?",
                ctx.yes,
            )? {
                return Ok(());
            }
            util::dispatch(editor, DiagramAction::ResetProject)?;
            output::notice("Project cleared", ctx.quiet);
            Ok(())
        }

        ProjectCommand::Export { file } => write_export(&editor.project(), file, ctx.quiet),

        ProjectCommand::Import { file } => {
            util::ensure_writable(editor)?;
            let text = std::fs::read_to_string(&file)?;
            let imported = codec::decode(&text)?;
            let current = editor.project();
            if !current.devices.is_empty() || current.floor_plan.is_some() {
                let prompt = format!(
                    "Replace '{}' ({} devices) with '{}'?",
                    current.name,
                    current.devices.len(),
                    imported.name
                );
                if !util::confirm(&prompt, ctx.yes)? {
                    return Ok(());
                }
            }
            let name = imported.name.clone();
            util::dispatch(editor, DiagramAction::LoadProject(Box::new(imported)))?;
            output::notice(&format!("Imported '{name}'"), ctx.quiet);
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn export_writes_decodable_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let project = Project::default().rename("Tầng 1");
        write_export(&project, Some(path.clone()), true).unwrap();
        let back = codec::decode(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(back, project);
    }

    #[test]
    fn detail_flags_read_only() {
        let summary = Summary {
            name: "Kho".into(),
            origin: "shared",
            read_only: true,
            devices: 2,
            connections: 1,
            floor_plan: None,
            last_updated: "2024-01-01T00:00:00+00:00".into(),
        };
        let text = detail(&summary, false);
        assert!(text.starts_with("Kho\n"));
        assert!(text.contains("Read-only:   yes"));
        assert!(text.contains("Floor plan:  -"));
    }
}
