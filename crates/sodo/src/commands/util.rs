//! Shared helpers for command handlers.

use std::sync::Arc;

use sodo_core::{
    Connection, Device, DiagramAction, Editor, EntityId, FileSlot, Outcome, Point, Project,
    ProjectStore,
};
use tracing::{debug, warn};

use crate::config::Context;
use crate::error::CliError;

/// Open the saved project (or the `--share` link) behind an [`Editor`].
pub fn open_editor(ctx: &Context) -> Editor {
    let slot = Arc::new(FileSlot::new(ctx.data_dir.clone()));
    let store = ProjectStore::open(slot, ctx.share.as_deref());
    if ctx.share.is_some() && !store.is_read_only() {
        warn!("share link could not be decoded, continuing with the saved project");
    }
    debug!(origin = ?store.origin(), dir = %ctx.data_dir.display(), "project opened");
    Editor::new(store, ctx.config.editor.range_policy)
}

/// Fail fast for mutating commands on a shared, read-only project.
pub fn ensure_writable(editor: &Editor) -> Result<(), CliError> {
    if editor.is_read_only() {
        return Err(CliError::ReadOnly);
    }
    Ok(())
}

/// Dispatch and surface a failed write to the data directory.
pub fn dispatch(editor: &mut Editor, action: DiagramAction) -> Result<Outcome, CliError> {
    let outcome = editor.dispatch(action)?;
    if let Some(err) = editor.store_mut().take_write_error() {
        return Err(CliError::Io(err));
    }
    Ok(outcome)
}

/// Like [`dispatch`], but an action the diagram ignored is an error.
pub fn dispatch_committed(
    editor: &mut Editor,
    action: DiagramAction,
    reason: &str,
) -> Result<Outcome, CliError> {
    let name = action.name();
    let outcome = dispatch(editor, action)?;
    if !outcome.committed {
        return Err(CliError::Rejected {
            action: name.into(),
            reason: reason.into(),
        });
    }
    Ok(outcome)
}

/// Resolve a device identifier (ID or exact name) against the snapshot.
pub fn resolve_device<'a>(project: &'a Project, identifier: &str) -> Result<&'a Device, CliError> {
    if let Some(device) = project.device(&EntityId::new(identifier)) {
        return Ok(device);
    }
    let mut named = project.devices.iter().filter(|d| d.name == identifier);
    match (named.next(), named.next()) {
        (Some(device), None) => Ok(device),
        (Some(_), Some(_)) => Err(CliError::Ambiguous {
            resource_type: "device".into(),
            identifier: identifier.into(),
        }),
        _ => Err(CliError::NotFound {
            resource_type: "device".into(),
            identifier: identifier.into(),
            list_command: "devices list".into(),
        }),
    }
}

pub fn resolve_connection<'a>(
    project: &'a Project,
    identifier: &str,
) -> Result<&'a Connection, CliError> {
    project
        .connection(&EntityId::new(identifier))
        .ok_or_else(|| CliError::NotFound {
            resource_type: "connection".into(),
            identifier: identifier.into(),
            list_command: "connections list".into(),
        })
}

/// Parse `"X,Y"` into a point.
pub fn parse_point(field: &str, raw: &str) -> Result<Point, CliError> {
    let invalid = || CliError::Validation {
        field: field.into(),
        reason: format!("expected X,Y, got '{raw}'"),
    };
    let (x, y) = raw.split_once(',').ok_or_else(invalid)?;
    let x: f64 = x.trim().parse().map_err(|_| invalid())?;
    let y: f64 = y.trim().parse().map_err(|_| invalid())?;
    if !(x.is_finite() && y.is_finite()) {
        return Err(invalid());
    }
    Ok(Point::new(x, y))
}

/// Reject NaN and infinities before they reach the diagram.
pub fn finite(field: &str, value: f64) -> Result<f64, CliError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CliError::Validation {
            field: field.into(),
            reason: format!("expected a finite number, got {value}"),
        })
    }
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use sodo_core::IdGenerator;

    use super::*;

    fn project() -> Project {
        let ids = IdGenerator::new();
        let p = Project::default();
        let mut a = p.create_device(&ids, Point::new(0.0, 0.0));
        a.name = "Cổng".into();
        let p = p.add_device(a);
        let mut b = p.create_device(&ids, Point::new(10.0, 0.0));
        b.name = "Kho".into();
        let p = p.add_device(b);
        let mut c = p.create_device(&ids, Point::new(20.0, 0.0));
        c.name = "Kho".into();
        p.add_device(c)
    }

    #[test]
    fn devices_resolve_by_id_or_unique_name() {
        let p = project();
        let id = p.devices[1].id.to_string();
        assert_eq!(resolve_device(&p, &id).unwrap().id.as_str(), id);
        assert_eq!(resolve_device(&p, "Cổng").unwrap().id, p.devices[0].id);
        assert!(matches!(resolve_device(&p, "Kho"), Err(CliError::Ambiguous { .. })));
        assert!(matches!(resolve_device(&p, "nope"), Err(CliError::NotFound { .. })));
    }

    #[test]
    fn points_parse_with_spaces_and_signs() {
        let p = parse_point("toward", " -12.5, 40 ").unwrap();
        assert_eq!(p, Point::new(-12.5, 40.0));
        assert!(parse_point("toward", "12").is_err());
        assert!(parse_point("toward", "a,b").is_err());
        assert!(parse_point("toward", "inf,0").is_err());
    }
}
