//! Edit form for one device.
//!
//! Text fields use `tui-input`; category and status cycle with ←/→.
//! Numbers are parsed on submit, so a half-typed value never reaches the
//! project. Range policy (wrapping, clamping) is applied by the editor.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use sodo_core::{Device, DeviceCategory, DeviceStatus};
use strum::IntoEnumIterator;
use tui_input::Input;

use crate::theme;

use super::{centered_rect, dialog, input_request};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Category,
    Status,
    Ip,
    Mac,
    Notes,
    Rotation,
    Fov,
}

impl Field {
    const ALL: [Field; 8] = [
        Self::Name,
        Self::Category,
        Self::Status,
        Self::Ip,
        Self::Mac,
        Self::Notes,
        Self::Rotation,
        Self::Fov,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Category => "Type",
            Self::Status => "Status",
            Self::Ip => "IP",
            Self::Mac => "MAC",
            Self::Notes => "Notes",
            Self::Rotation => "Rotation",
            Self::Fov => "FOV",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormOutcome {
    Pending,
    Cancel,
    Submit(Box<Device>),
    Invalid(String),
}

#[derive(Debug)]
pub struct DeviceForm {
    original: Device,
    focus: usize,
    category: DeviceCategory,
    status: DeviceStatus,
    name: Input,
    ip: Input,
    mac: Input,
    notes: Input,
    rotation: Input,
    fov: Input,
}

impl DeviceForm {
    pub fn new(device: &Device) -> Self {
        Self {
            original: device.clone(),
            focus: 0,
            category: device.category,
            status: device.status,
            name: Input::new(device.name.clone()),
            ip: Input::new(device.ip.clone()),
            mac: Input::new(device.mac.clone()),
            notes: Input::new(device.notes.clone()),
            rotation: Input::new(format_number(device.rotation)),
            fov: Input::new(format_number(device.fov)),
        }
    }

    fn field(&self) -> Field {
        Field::ALL.get(self.focus).copied().unwrap_or(Field::Name)
    }

    /// FOV only means something for camera categories.
    fn visible(&self, field: Field) -> bool {
        field != Field::Fov || self.category.has_field_of_view()
    }

    fn step_focus(&mut self, forward: bool) {
        let len = Field::ALL.len();
        loop {
            self.focus = if forward {
                (self.focus + 1) % len
            } else {
                (self.focus + len - 1) % len
            };
            if self.visible(self.field()) {
                break;
            }
        }
    }

    fn input_mut(&mut self, field: Field) -> Option<&mut Input> {
        match field {
            Field::Name => Some(&mut self.name),
            Field::Ip => Some(&mut self.ip),
            Field::Mac => Some(&mut self.mac),
            Field::Notes => Some(&mut self.notes),
            Field::Rotation => Some(&mut self.rotation),
            Field::Fov => Some(&mut self.fov),
            Field::Category | Field::Status => None,
        }
    }

    fn input(&self, field: Field) -> Option<&Input> {
        match field {
            Field::Name => Some(&self.name),
            Field::Ip => Some(&self.ip),
            Field::Mac => Some(&self.mac),
            Field::Notes => Some(&self.notes),
            Field::Rotation => Some(&self.rotation),
            Field::Fov => Some(&self.fov),
            Field::Category | Field::Status => None,
        }
    }

    fn cycle(&mut self, forward: bool) {
        match self.field() {
            Field::Category => self.category = cycle(self.category, forward),
            Field::Status => self.status = cycle(self.status, forward),
            _ => {}
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FormOutcome {
        let field = self.field();
        match key.code {
            KeyCode::Esc => return FormOutcome::Cancel,
            KeyCode::Enter => return self.submit(),
            KeyCode::Tab | KeyCode::Down => self.step_focus(true),
            KeyCode::BackTab | KeyCode::Up => self.step_focus(false),
            KeyCode::Left | KeyCode::Right if self.input(field).is_none() => {
                self.cycle(key.code == KeyCode::Right);
            }
            KeyCode::Char(' ') if self.input(field).is_none() => self.cycle(true),
            KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return self.submit();
            }
            _ => {
                if let (Some(input), Some(req)) = (self.input_mut(field), input_request(key)) {
                    input.handle(req);
                }
            }
        }
        FormOutcome::Pending
    }

    fn submit(&self) -> FormOutcome {
        let name = self.name.value().trim();
        if name.is_empty() {
            return FormOutcome::Invalid("Name cannot be empty".into());
        }
        let rotation = match parse_number(&self.rotation, "Rotation") {
            Ok(v) => v,
            Err(e) => return FormOutcome::Invalid(e),
        };
        let fov = match parse_number(&self.fov, "FOV") {
            Ok(v) => v,
            Err(e) => return FormOutcome::Invalid(e),
        };
        let mut device = self.original.clone();
        device.name = name.to_owned();
        device.category = self.category;
        device.status = self.status;
        device.ip = self.ip.value().trim().to_owned();
        device.mac = self.mac.value().trim().to_owned();
        device.notes = self.notes.value().to_owned();
        device.rotation = rotation;
        device.fov = fov;
        FormOutcome::Submit(Box::new(device))
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let rows: Vec<Field> = Field::ALL.into_iter().filter(|f| self.visible(*f)).collect();
        let height = u16::try_from(rows.len()).unwrap_or(8) + 4;
        let rect = centered_rect(area, 56, height);
        let title = format!(" {} ", self.original.id);
        let inner = dialog(frame, rect, &title, theme::border_focused());

        for (row, field) in (0u16..).zip(rows.iter().copied()) {
            if row >= inner.height {
                break;
            }
            let line_area = Rect::new(inner.x, inner.y + row, inner.width, 1);
            let focused = field == self.field();
            let label_style = if focused {
                theme::key_hint_key()
            } else {
                theme::key_hint()
            };
            let value = match field {
                Field::Category => format!("‹ {} ›", self.category.label()),
                Field::Status => format!("‹ {} ›", self.status.label()),
                _ => self
                    .input(field)
                    .map_or_else(String::new, |i| i.value().to_owned()),
            };
            let value_style = if focused {
                theme::table_row().add_modifier(Modifier::BOLD)
            } else {
                theme::table_row()
            };
            frame.render_widget(
                Paragraph::new(Line::from(vec![
                    Span::styled(format!(" {:<9}", field.label()), label_style),
                    Span::styled(value, value_style),
                ])),
                line_area,
            );
            if focused {
                if let Some(input) = self.input(field) {
                    let cursor = u16::try_from(input.visual_cursor()).unwrap_or(0);
                    frame.set_cursor_position(Position::new(
                        (line_area.x + 10 + cursor).min(line_area.right().saturating_sub(1)),
                        line_area.y,
                    ));
                }
            }
        }

        let hints_y = inner.y + inner.height.saturating_sub(1);
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(" ↑↓ ", theme::key_hint_key()),
                Span::styled("field  ", theme::key_hint()),
                Span::styled("←→ ", theme::key_hint_key()),
                Span::styled("choose  ", theme::key_hint()),
                Span::styled("Enter ", theme::key_hint_key()),
                Span::styled("save  ", theme::key_hint()),
                Span::styled("Esc ", theme::key_hint_key()),
                Span::styled("cancel", Style::default().fg(theme::SLATE)),
            ])),
            Rect::new(inner.x, hints_y, inner.width, 1),
        );
    }
}

fn cycle<T: IntoEnumIterator + PartialEq + Copy>(current: T, forward: bool) -> T {
    let all: Vec<T> = T::iter().collect();
    let idx = all.iter().position(|v| *v == current).unwrap_or(0);
    let next = if forward {
        (idx + 1) % all.len()
    } else {
        (idx + all.len() - 1) % all.len()
    };
    all.get(next).copied().unwrap_or(current)
}

fn format_number(value: f64) -> String {
    if value.fract().abs() < f64::EPSILON {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

fn parse_number(input: &Input, label: &str) -> Result<f64, String> {
    let raw = input.value().trim();
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("{label} must be a number, got '{raw}'"))
}
