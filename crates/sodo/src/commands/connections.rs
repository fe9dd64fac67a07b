//! Connection command handlers.

use sodo_core::{Connection, DiagramAction, Editor, LinkMedium, Project};
use tabled::Tabled;

use crate::cli::{ConnectionsArgs, ConnectionsCommand};
use crate::config::Context;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ConnectionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Link")]
    link: String,
    #[tabled(rename = "Type")]
    medium: String,
    #[tabled(rename = "Label")]
    label: String,
}

impl ConnectionRow {
    fn new(project: &Project, c: &Connection) -> Self {
        Self {
            id: c.id.to_string(),
            link: project.connection_label(c),
            medium: c.medium.slug().into(),
            label: c.label.clone().unwrap_or_default(),
        }
    }
}

fn parse_medium(raw: &str) -> Result<LinkMedium, CliError> {
    raw.parse::<LinkMedium>().map_err(|e| CliError::Validation {
        field: "type".into(),
        reason: e.to_string(),
    })
}

fn print_connection(project: &Project, c: &Connection, ctx: &Context) -> Result<(), CliError> {
    let out = output::render_single(
        ctx.output,
        c,
        |c| {
            [
                format!("ID:    {}", c.id),
                format!("Link:  {}", project.connection_label(c)),
                format!("Type:  {}", c.medium.slug()),
                format!("Label: {}", c.label.as_deref().unwrap_or("-")),
            ]
            .join("\n")
        },
        |c| c.id.to_string(),
    )?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(
    editor: &mut Editor,
    args: ConnectionsArgs,
    ctx: &Context,
) -> Result<(), CliError> {
    match args.command {
        ConnectionsCommand::List => {
            let project = editor.project();
            let out = output::render_list(
                ctx.output,
                &project.connections,
                |c| ConnectionRow::new(&project, c),
                |c| c.id.to_string(),
            )?;
            output::print_output(&out, ctx.quiet);
            Ok(())
        }

        ConnectionsCommand::Add {
            from,
            to,
            medium,
            label,
        } => {
            util::ensure_writable(editor)?;
            let medium = medium.as_deref().map(parse_medium).transpose()?;
            let project = editor.project();
            let from = util::resolve_device(&project, &from)?.id.clone();
            let to = util::resolve_device(&project, &to)?.id.clone();
            if from == to {
                return Err(CliError::Validation {
                    field: "to".into(),
                    reason: "a device cannot be connected to itself".into(),
                });
            }
            util::dispatch_committed(
                editor,
                DiagramAction::AddConnection { from, to },
                "the connection could not be created",
            )?;
            let project = editor.project();
            let Some(mut created) = project.connections.last().cloned() else {
                return Ok(());
            };
            let label = label.filter(|l| !l.is_empty());
            if medium.is_some() || label.is_some() {
                if let Some(medium) = medium {
                    created.medium = medium;
                }
                if label.is_some() {
                    created.label = label;
                }
                util::dispatch(editor, DiagramAction::EditConnection(created.clone()))?;
            }
            output::notice(&format!("Connected {}", project.connection_label(&created)), ctx.quiet);
            print_connection(&editor.project(), &created, ctx)
        }

        ConnectionsCommand::Update {
            connection,
            medium,
            label,
        } => {
            util::ensure_writable(editor)?;
            if medium.is_none() && label.is_none() {
                return Err(CliError::Validation {
                    field: "update".into(),
                    reason: "nothing to change; pass --type or --label".into(),
                });
            }
            let mut edited = util::resolve_connection(&editor.project(), &connection)?.clone();
            if let Some(raw) = medium {
                edited.medium = parse_medium(&raw)?;
            }
            if let Some(label) = label {
                edited.label = Some(label).filter(|l| !l.is_empty());
            }
            util::dispatch(editor, DiagramAction::EditConnection(edited.clone()))?;
            print_connection(&editor.project(), &edited, ctx)
        }

        ConnectionsCommand::Remove { connection } => {
            util::ensure_writable(editor)?;
            let project = editor.project();
            let target = util::resolve_connection(&project, &connection)?;
            let prompt = format!("Delete connection {}?", project.connection_label(target));
            if !util::confirm(&prompt, ctx.yes)? {
                return Ok(());
            }
            let id = target.id.clone();
            util::dispatch_committed(
                editor,
                DiagramAction::DeleteConnection(id.clone()),
                "connection no longer exists",
            )?;
            output::notice(&format!("Deleted {id}"), ctx.quiet);
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use sodo_core::{IdGenerator, Point};

    use super::*;

    #[test]
    fn rows_name_both_ends() {
        let ids = IdGenerator::new();
        let p = Project::default();
        let mut a = p.create_device(&ids, Point::new(0.0, 0.0));
        a.name = "NVR".into();
        let p = p.add_device(a.clone());
        let mut b = p.create_device(&ids, Point::new(1.0, 0.0));
        b.name = "Cổng".into();
        let p = p.add_device(b.clone());
        let c = p.create_connection(&ids, a.id, b.id).unwrap();
        let row = ConnectionRow::new(&p, &c);
        assert_eq!(row.link, "NVR → Cổng");
        assert_eq!(row.medium, "wired");
        assert_eq!(row.label, "");
    }

    #[test]
    fn medium_accepts_wire_labels() {
        assert_eq!(parse_medium("wireless").unwrap(), LinkMedium::Wireless);
        assert!(matches!(parse_medium("fibre"), Err(CliError::Validation { .. })));
    }
}
