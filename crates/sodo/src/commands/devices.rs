//! Device command handlers.

use sodo_core::geometry;
use sodo_core::{
    Device, DeviceCategory, DeviceStatus, DiagramAction, Editor, Effect, EntityId, Point,
};
use tabled::Tabled;

use crate::cli::{DeviceFields, DevicesArgs, DevicesCommand};
use crate::config::Context;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    category: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Position")]
    position: String,
    #[tabled(rename = "Rotation")]
    rotation: String,
}

impl From<&Device> for DeviceRow {
    fn from(d: &Device) -> Self {
        Self {
            id: d.id.to_string(),
            name: d.name.clone(),
            category: d.category.label().into(),
            status: d.status.label().into(),
            ip: d.ip.clone(),
            position: format!("{:.0}, {:.0}", d.x, d.y),
            rotation: if d.category.has_field_of_view() {
                format!("{:.0}° / {:.0}°", d.rotation, d.fov)
            } else {
                "-".into()
            },
        }
    }
}

fn dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

fn detail(d: &Device, color: bool) -> String {
    let mut lines = vec![
        output::heading(&d.name, color),
        format!("ID:       {}", d.id),
        format!("Type:     {}", d.category.label()),
        format!("Status:   {}", output::paint_status(d.status, color)),
        format!("IP:       {}", dash(&d.ip)),
        format!("MAC:      {}", dash(&d.mac)),
        format!("Position: {:.1}, {:.1}", d.x, d.y),
    ];
    if d.category.has_field_of_view() {
        lines.push(format!("Rotation: {:.1}°", d.rotation));
        lines.push(format!("FOV:      {:.1}°", d.fov));
    }
    if d.category.has_broadcast_radius() {
        lines.push(format!("Coverage: {:.0} px", geometry::BROADCAST_RADIUS));
    }
    if !d.notes.is_empty() {
        lines.push(format!("Notes:    {}", d.notes));
    }
    lines.join("\n")
}

// ── Field editing ───────────────────────────────────────────────────

fn apply_fields(mut device: Device, fields: &DeviceFields) -> Result<Device, CliError> {
    if let Some(name) = &fields.name {
        device.name.clone_from(name);
    }
    if let Some(raw) = &fields.category {
        device.category = raw
            .parse::<DeviceCategory>()
            .map_err(|e| CliError::Validation {
                field: "type".into(),
                reason: e.to_string(),
            })?;
    }
    if let Some(raw) = &fields.status {
        device.status = raw.parse::<DeviceStatus>().map_err(|e| CliError::Validation {
            field: "status".into(),
            reason: e.to_string(),
        })?;
    }
    if let Some(ip) = &fields.ip {
        device.ip.clone_from(ip);
    }
    if let Some(mac) = &fields.mac {
        device.mac.clone_from(mac);
    }
    if let Some(notes) = &fields.notes {
        device.notes.clone_from(notes);
    }
    if let Some(rotation) = fields.rotation {
        device.rotation = util::finite("rotation", rotation)?;
    }
    if let Some(fov) = fields.fov {
        device.fov = util::finite("fov", fov)?;
    }
    Ok(device)
}

fn has_changes(fields: &DeviceFields) -> bool {
    fields.name.is_some()
        || fields.category.is_some()
        || fields.status.is_some()
        || fields.ip.is_some()
        || fields.mac.is_some()
        || fields.notes.is_some()
        || fields.rotation.is_some()
        || fields.fov.is_some()
}

fn show(editor: &Editor, id: &EntityId, ctx: &Context) -> Result<(), CliError> {
    let project = editor.project();
    let device = project
        .device(id)
        .ok_or_else(|| CliError::NotFound {
            resource_type: "device".into(),
            identifier: id.to_string(),
            list_command: "devices list".into(),
        })?;
    let out = output::render_single(
        ctx.output,
        device,
        |d| detail(d, ctx.color),
        |d| d.id.to_string(),
    )?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub fn handle(editor: &mut Editor, args: DevicesArgs, ctx: &Context) -> Result<(), CliError> {
    match args.command {
        DevicesCommand::List => {
            let project = editor.project();
            let out = output::render_list(
                ctx.output,
                &project.devices,
                |d| DeviceRow::from(d),
                |d| d.id.to_string(),
            )?;
            output::print_output(&out, ctx.quiet);
            Ok(())
        }

        DevicesCommand::Get { device } => {
            let id = util::resolve_device(&editor.project(), &device)?.id.clone();
            show(editor, &id, ctx)
        }

        DevicesCommand::Add { x, y, fields } => {
            util::ensure_writable(editor)?;
            let at = Point::new(util::finite("x", x)?, util::finite("y", y)?);
            // Reject bad attributes before anything is placed.
            apply_fields(Device::create(EntityId::new("probe"), at, 0), &fields)?;
            util::dispatch(editor, DiagramAction::ToggleAddMode)?;
            let outcome = util::dispatch_committed(
                editor,
                DiagramAction::CanvasClick(at),
                "the device could not be placed",
            )?;
            let Some(Effect::OpenEditor(id)) = outcome.effect else {
                return Err(CliError::Rejected {
                    action: "CanvasClick".into(),
                    reason: "no device was placed".into(),
                });
            };
            if has_changes(&fields) {
                let placed = util::resolve_device(&editor.project(), id.as_str())?.clone();
                let edited = apply_fields(placed, &fields)?;
                util::dispatch(editor, DiagramAction::EditDevice(edited))?;
            }
            output::notice(&format!("Placed {id}"), ctx.quiet);
            show(editor, &id, ctx)
        }

        DevicesCommand::Update { device, fields } => {
            util::ensure_writable(editor)?;
            if !has_changes(&fields) {
                return Err(CliError::Validation {
                    field: "update".into(),
                    reason: "nothing to change; pass at least one attribute flag".into(),
                });
            }
            let current = util::resolve_device(&editor.project(), &device)?.clone();
            let id = current.id.clone();
            let edited = apply_fields(current, &fields)?;
            util::dispatch(editor, DiagramAction::EditDevice(edited))?;
            show(editor, &id, ctx)
        }

        DevicesCommand::Move { device, x, y } => {
            util::ensure_writable(editor)?;
            let id = util::resolve_device(&editor.project(), &device)?.id.clone();
            let to = Point::new(util::finite("x", x)?, util::finite("y", y)?);
            let outcomes = editor.dispatch_all([
                DiagramAction::DragStart(id.clone()),
                DiagramAction::DragMove(to),
                DiagramAction::DragEnd,
            ])?;
            if let Some(err) = editor.store_mut().take_write_error() {
                return Err(CliError::Io(err));
            }
            if !outcomes.iter().any(|o| o.committed) {
                output::notice("Device already at that position", ctx.quiet);
            }
            show(editor, &id, ctx)
        }

        DevicesCommand::Rotate {
            device,
            degrees,
            toward,
        } => {
            util::ensure_writable(editor)?;
            let current = util::resolve_device(&editor.project(), &device)?.clone();
            let id = current.id.clone();
            match (degrees, toward) {
                (Some(degrees), _) => {
                    let mut turned = current;
                    turned.rotation = util::finite("degrees", degrees)?;
                    util::dispatch(editor, DiagramAction::EditDevice(turned))?;
                }
                (None, Some(raw)) => {
                    let target = util::parse_point("toward", &raw)?;
                    if target == current.position() {
                        return Err(CliError::Validation {
                            field: "toward".into(),
                            reason: "target is the device position".into(),
                        });
                    }
                    // Drag the handle along the ray to the target.
                    let heading = geometry::compute_rotation(current.position(), target);
                    let handle = geometry::handle_position(
                        current.position(),
                        heading,
                        ctx.config.editor.handle_offset,
                    );
                    editor.dispatch_all([
                        DiagramAction::RotateStart(id.clone()),
                        DiagramAction::RotateMove(handle),
                        DiagramAction::RotateEnd,
                    ])?;
                    if let Some(err) = editor.store_mut().take_write_error() {
                        return Err(CliError::Io(err));
                    }
                }
                (None, None) => {
                    return Err(CliError::Validation {
                        field: "rotate".into(),
                        reason: "pass --degrees or --toward".into(),
                    });
                }
            }
            show(editor, &id, ctx)
        }

        DevicesCommand::Remove { device } => {
            util::ensure_writable(editor)?;
            let project = editor.project();
            let target = util::resolve_device(&project, &device)?;
            let links = project
                .connections
                .iter()
                .filter(|c| c.touches(&target.id))
                .count();
            let prompt = format!(
                "Delete device '{}' and {links} connection(s)?",
                target.name
            );
            if !util::confirm(&prompt, ctx.yes)? {
                return Ok(());
            }
            let id = target.id.clone();
            util::dispatch_committed(
                editor,
                DiagramAction::DeleteDevice(id.clone()),
                "device no longer exists",
            )?;
            output::notice(&format!("Deleted {id}"), ctx.quiet);
            Ok(())
        }
    }
}
