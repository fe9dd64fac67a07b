//! Map screen: the floor plan as a braille canvas plus a detail panel.
//!
//! Image space has y growing downwards; the canvas y axis grows upwards,
//! so every point is drawn at `(x, -y)` against `y_bounds = [-bottom, -top]`.
//! The floor-plan bitmap itself is not drawn, only its outline.
//!
//! The canvas extent is recomputed only when a refresh carries a new
//! project, since measuring it decodes the floor-plan image.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Position, Rect},
    style::{Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Block, BorderType, Borders, Paragraph, Wrap,
        canvas::{Canvas, Circle, Context, Line as Segment, Rectangle},
    },
};
use sodo_core::{
    Device, DiagramAction, EntityId, InteractionMode, Point,
    geometry::{self, FovWedge},
};
use sodo_render::{CanvasSize, canvas_size};
use tokio::sync::mpsc::UnboundedSender;

use crate::action::{Action, ConfirmAction, Notification, View};
use crate::component::Component;
use crate::theme;

/// Degrees per `[` / `]` press.
const ROTATE_STEP: f64 = 15.0;
const WEDGE_SEGMENTS: usize = 18;
const PANEL_WIDTH: u16 = 34;

#[derive(Debug, Clone, Copy, PartialEq)]
enum MouseGesture {
    /// Grab offset from the pointer to the device centre.
    Move { dx: f64, dy: f64 },
    Rotate,
}

pub struct MapScreen {
    view: Arc<View>,
    action_tx: Option<UnboundedSender<Action>>,
    pointer: Point,
    nudge: f64,
    handle_offset: f64,
    canvas_area: Rect,
    gesture: Option<MouseGesture>,
    size: CanvasSize,
}

impl MapScreen {
    pub fn new(nudge: f64, handle_offset: f64) -> Self {
        Self {
            view: Arc::new(View::default()),
            action_tx: None,
            pointer: Point::new(40.0, 40.0),
            nudge,
            handle_offset,
            canvas_area: Rect::default(),
            gesture: None,
            size: CanvasSize::default(),
        }
    }

    fn size(&self) -> CanvasSize {
        self.size
    }

    fn send(&self, action: Action) {
        if let Some(tx) = &self.action_tx {
            let _ = tx.send(action);
        }
    }

    fn selected(&self) -> Option<&Device> {
        let id = self.view.state.selected.as_ref()?;
        self.view.state.view_device(&self.view.project, id)
    }

    /// Image units covered by one terminal cell.
    fn cell_size(&self) -> (f64, f64) {
        cell_size(self.canvas_area, self.size())
    }

    /// Pick radius: the diagram's hit radius, widened to at least one cell.
    fn hit_radius(&self) -> f64 {
        let (w, h) = self.cell_size();
        geometry::HIT_RADIUS.max(w.max(h))
    }

    fn device_at(&self, point: Point) -> Option<EntityId> {
        geometry::hit_test(&self.view.project.devices, point, self.hit_radius()).map(|d| d.id.clone())
    }

    fn click_at(&mut self, point: Point) -> Action {
        self.pointer = point;
        let action = match self.device_at(point) {
            Some(id) => DiagramAction::DeviceClick(id),
            None => DiagramAction::CanvasClick(point),
        };
        Action::Diagram(action)
    }

    fn move_pointer(&mut self, dx: f64, dy: f64) {
        let size = self.size();
        self.pointer = Point::new(
            (self.pointer.x + dx).clamp(size.x, size.right()),
            (self.pointer.y + dy).clamp(size.y, size.bottom()),
        );
    }

    /// Keyboard drag: one full gesture per key press.
    fn nudge_selected(&self, dx: f64, dy: f64) -> Option<Action> {
        let device = self.selected()?;
        let id = device.id.clone();
        let target = device.position().offset(dx, dy);
        self.send(Action::Diagram(DiagramAction::DragStart(id)));
        self.send(Action::Diagram(DiagramAction::DragMove(target)));
        Some(Action::Diagram(DiagramAction::DragEnd))
    }

    fn rotate_selected(&self, delta: f64) -> Option<Action> {
        let device = self.selected()?;
        if !device.category.has_field_of_view() {
            return Some(Action::Notify(Notification::info(format!(
                "{} has no heading",
                device.category.label()
            ))));
        }
        let mut edited = device.clone();
        edited.rotation += delta;
        Some(Action::Diagram(DiagramAction::EditDevice(edited)))
    }

    fn on_rotation_handle(&self, point: Point) -> Option<EntityId> {
        let device = self.selected()?;
        if !device.category.has_field_of_view() {
            return None;
        }
        let handle = geometry::handle_position(device.position(), device.rotation, self.handle_offset);
        (handle.distance_to(point) <= self.hit_radius()).then(|| device.id.clone())
    }

    fn can_drag(&self) -> bool {
        !self.view.read_only && self.view.state.mode == InteractionMode::Idle
    }

    fn mode_line(&self) -> Line<'static> {
        let state = &self.view.state;
        let (tag, text) = match &state.mode {
            InteractionMode::Idle => return Line::from(""),
            InteractionMode::PlacingDevice => ("ADD", "Enter or click places a device".to_owned()),
            InteractionMode::Connecting { source: None } => {
                ("CONNECT", "pick the source device".to_owned())
            }
            InteractionMode::Connecting { source: Some(id) } => {
                let name = self
                    .view
                    .project
                    .device(id)
                    .map_or_else(|| id.to_string(), |d| d.name.clone());
                ("CONNECT", format!("pick the target for {name}"))
            }
        };
        Line::from(vec![
            Span::styled(
                format!(" {tag} "),
                Style::default()
                    .fg(theme::BG_PANEL)
                    .bg(theme::ACCENT)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!(" {text}"), theme::table_row()),
        ])
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render_canvas(&self, frame: &mut Frame, area: Rect) {
        let project = &self.view.project;
        let title = match &project.floor_plan {
            Some(_) => {
                let size = self.size();
                format!(" {} · plan {:.0}×{:.0} ", project.name, size.width, size.height)
            }
            None => format!(" {} ", project.name),
        };
        let block = Block::default()
            .title(title)
            .title_style(theme::title_style())
            .title_bottom(self.mode_line())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());
        let size = self.size();
        let canvas = Canvas::default()
            .block(block)
            .marker(Marker::Braille)
            .x_bounds([size.x, size.right()])
            .y_bounds([-size.bottom(), -size.y])
            .paint(|ctx| self.paint(ctx, size));
        frame.render_widget(canvas, area);
    }

    fn paint(&self, ctx: &mut Context<'_>, size: CanvasSize) {
        let project = &self.view.project;
        let state = &self.view.state;
        let (cell_w, _) = self.cell_size();

        if project.floor_plan.is_some() {
            ctx.draw(&Rectangle {
                x: 0.0,
                y: -size.bottom(),
                width: size.right(),
                height: size.bottom(),
                color: theme::SLATE,
            });
        }

        // Coverage underneath everything else.
        for device in state.view_devices(project) {
            if device.category.has_broadcast_radius() {
                ctx.draw(&Circle {
                    x: device.x,
                    y: -device.y,
                    radius: geometry::BROADCAST_RADIUS,
                    color: theme::COVERAGE,
                });
            }
            if let Some(wedge) = FovWedge::for_device(device) {
                draw_polyline(ctx, &wedge.outline(WEDGE_SEGMENTS), true, theme::WEDGE);
            }
        }
        ctx.layer();

        for connection in &project.connections {
            let (Some(from), Some(to)) = (
                state.view_device(project, &connection.from_id),
                state.view_device(project, &connection.to_id),
            ) else {
                continue;
            };
            let color = theme::link_color(connection.medium);
            let (a, b) = (from.position(), to.position());
            draw_polyline(ctx, &[a, b], false, color);
            if let Some([tip, left, right]) = geometry::arrow_head(a, b) {
                draw_polyline(ctx, &[left, tip, right], false, color);
            }
        }
        ctx.layer();

        if let Some(device) = self.selected() {
            ctx.draw(&Circle {
                x: device.x,
                y: -device.y,
                radius: geometry::SELECTION_RING_RADIUS,
                color: theme::SELECTION,
            });
            if device.category.has_field_of_view() && !self.view.read_only {
                let handle =
                    geometry::handle_position(device.position(), device.rotation, self.handle_offset);
                draw_polyline(ctx, &[device.position(), handle], false, theme::SELECTION);
                ctx.print(handle.x, -handle.y, Span::styled("◆", Style::default().fg(theme::SELECTION)));
            }
        }
        if let Some(source) = state.pending_source().and_then(|id| project.device(id)) {
            ctx.draw(&Circle {
                x: source.x,
                y: -source.y,
                radius: geometry::SELECTION_RING_RADIUS,
                color: theme::VIOLET,
            });
        }

        for device in state.view_devices(project) {
            let style = Style::default()
                .fg(theme::status_color(device.status))
                .add_modifier(Modifier::BOLD);
            ctx.print(device.x, -device.y, Span::styled("●", style));
            let label: String = device.name.chars().take(16).collect();
            ctx.print(
                device.x + cell_w * 2.0,
                -device.y,
                Span::styled(label, theme::table_row()),
            );
        }

        let glyph = if state.is_placing() { "⊕" } else { "+" };
        ctx.print(
            self.pointer.x,
            -self.pointer.y,
            Span::styled(glyph, Style::default().fg(theme::POINTER).add_modifier(Modifier::BOLD)),
        );
    }

    fn render_panel(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Selected ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());
        let mut lines = Vec::new();
        if self.view.read_only {
            lines.push(Line::from(Span::styled(" SHARED · READ-ONLY ", theme::read_only_badge())));
            lines.push(Line::from(Span::styled("x to edit your own copy", theme::key_hint())));
            lines.push(Line::from(""));
        }
        match self.selected() {
            Some(device) => lines.extend(detail_lines(device, self.link_count(&device.id))),
            None => lines.push(Line::from(Span::styled("Nothing selected", theme::key_hint()))),
        }
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Pointer ", theme::key_hint()),
            Span::styled(
                format!("{:.0}, {:.0}", self.pointer.x, self.pointer.y),
                theme::table_row(),
            ),
        ]));
        frame.render_widget(
            Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
            area,
        );
    }

    fn link_count(&self, id: &EntityId) -> usize {
        self.view
            .project
            .connections
            .iter()
            .filter(|c| c.touches(id))
            .count()
    }
}

impl Component for MapScreen {
    fn init(&mut self, action_tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(action_tx);
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let step = self.nudge;
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);
        let delta = match key.code {
            KeyCode::Left => Some((-step, 0.0)),
            KeyCode::Right => Some((step, 0.0)),
            KeyCode::Up => Some((0.0, -step)),
            KeyCode::Down => Some((0.0, step)),
            _ => None,
        };
        if let Some((dx, dy)) = delta {
            if shift {
                return Ok(self.nudge_selected(dx, dy));
            }
            self.move_pointer(dx, dy);
            return Ok(None);
        }

        let action = match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => Some(self.click_at(self.pointer)),
            KeyCode::Char('a') => Some(Action::Diagram(DiagramAction::ToggleAddMode)),
            KeyCode::Char('c') => Some(Action::Diagram(DiagramAction::ToggleConnectMode)),
            KeyCode::Esc
                if self.view.state.mode != InteractionMode::Idle
                    || self.view.state.gesture.is_some() =>
            {
                Some(Action::Diagram(DiagramAction::Cancel))
            }
            KeyCode::Char('[') => self.rotate_selected(-ROTATE_STEP),
            KeyCode::Char(']') => self.rotate_selected(ROTATE_STEP),
            KeyCode::Char('e') => self.selected().map(|d| Action::EditDevice(d.id.clone())),
            KeyCode::Char('d') | KeyCode::Delete => self.selected().map(|d| {
                Action::ShowConfirm(ConfirmAction::DeleteDevice {
                    id: d.id.clone(),
                    name: d.name.clone(),
                })
            }),
            KeyCode::Char('g') => {
                if let Some(p) = self.selected().map(Device::position) {
                    self.pointer = p;
                }
                None
            }
            _ => None,
        };
        Ok(action)
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        let Some(point) = cell_to_image(self.canvas_area, self.size(), mouse.column, mouse.row)
        else {
            return Ok(None);
        };
        let action = match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.pointer = point;
                if self.can_drag() {
                    if let Some(id) = self.on_rotation_handle(point) {
                        self.gesture = Some(MouseGesture::Rotate);
                        return Ok(Some(Action::Diagram(DiagramAction::RotateStart(id))));
                    }
                }
                let click = self.click_at(point);
                let grabbed = match &click {
                    Action::Diagram(DiagramAction::DeviceClick(id)) if self.can_drag() => {
                        self.view.project.device(id).map(|d| (d.id.clone(), d.position()))
                    }
                    _ => None,
                };
                match grabbed {
                    Some((id, centre)) => {
                        self.send(click);
                        self.gesture = Some(MouseGesture::Move {
                            dx: centre.x - point.x,
                            dy: centre.y - point.y,
                        });
                        Some(Action::Diagram(DiagramAction::DragStart(id)))
                    }
                    None => Some(click),
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                self.pointer = point;
                match self.gesture {
                    Some(MouseGesture::Move { dx, dy }) => Some(Action::Diagram(
                        DiagramAction::DragMove(point.offset(dx, dy)),
                    )),
                    Some(MouseGesture::Rotate) => {
                        Some(Action::Diagram(DiagramAction::RotateMove(point)))
                    }
                    None => None,
                }
            }
            MouseEventKind::Up(MouseButton::Left) => match self.gesture.take() {
                Some(MouseGesture::Move { .. }) => Some(Action::Diagram(DiagramAction::DragEnd)),
                Some(MouseGesture::Rotate) => Some(Action::Diagram(DiagramAction::RotateEnd)),
                None => None,
            },
            MouseEventKind::Moved => {
                self.pointer = point;
                None
            }
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        if let Action::Refresh(view) = action {
            let project_changed = !Arc::ptr_eq(&self.view.project, &view.project);
            self.view = Arc::clone(view);
            if project_changed {
                self.size = canvas_size(&self.view.project);
            }
            if self.view.state.gesture.is_none() {
                self.gesture = None;
            }
        }
        Ok(None)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let [canvas_area, panel_area] =
            Layout::horizontal([Constraint::Min(20), Constraint::Length(PANEL_WIDTH)]).areas(area);
        self.canvas_area = Rect::new(
            canvas_area.x + 1,
            canvas_area.y + 1,
            canvas_area.width.saturating_sub(2),
            canvas_area.height.saturating_sub(2),
        );
        self.render_canvas(frame, canvas_area);
        self.render_panel(frame, panel_area);
    }

    fn hints(&self) -> &'static str {
        "a add  c connect  ←↑→↓ pointer  Enter click  ⇧+arrows move  [ ] rotate  e edit  d delete"
    }
}

// ── Helpers ───────────────────────────────────────────────────────────

fn draw_polyline(ctx: &mut Context<'_>, points: &[Point], closed: bool, color: ratatui::style::Color) {
    for pair in points.windows(2) {
        if let [a, b] = pair {
            ctx.draw(&Segment::new(a.x, -a.y, b.x, -b.y, color));
        }
    }
    if closed {
        if let (Some(first), Some(last)) = (points.first(), points.last()) {
            ctx.draw(&Segment::new(last.x, -last.y, first.x, -first.y, color));
        }
    }
}

fn cell_size(area: Rect, size: CanvasSize) -> (f64, f64) {
    (
        size.width / f64::from(area.width.max(1)),
        size.height / f64::from(area.height.max(1)),
    )
}

/// Terminal cell → image coordinates at the cell centre. `None` outside the canvas.
fn cell_to_image(area: Rect, size: CanvasSize, column: u16, row: u16) -> Option<Point> {
    if !area.contains(Position::new(column, row)) {
        return None;
    }
    let (w, h) = cell_size(area, size);
    Some(Point::new(
        size.x + (f64::from(column - area.x) + 0.5) * w,
        size.y + (f64::from(row - area.y) + 0.5) * h,
    ))
}

fn detail_lines(device: &Device, links: usize) -> Vec<Line<'static>> {
    let field = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("{label:<9}"), theme::key_hint()),
            Span::styled(value, theme::table_row()),
        ])
    };
    let or_dash = |s: &str| if s.is_empty() { "-".to_owned() } else { s.to_owned() };
    let mut lines = vec![
        Line::from(Span::styled(device.name.clone(), theme::title_style())),
        field("Type", device.category.label().to_owned()),
        Line::from(vec![
            Span::styled(format!("{:<9}", "Status"), theme::key_hint()),
            Span::styled(
                device.status.label().to_owned(),
                Style::default().fg(theme::status_color(device.status)),
            ),
        ]),
        field("IP", or_dash(&device.ip)),
        field("MAC", or_dash(&device.mac)),
        field("Position", format!("{:.0}, {:.0}", device.x, device.y)),
    ];
    if device.category.has_field_of_view() {
        lines.push(field("Heading", format!("{:.0}°", device.rotation)));
        lines.push(field("FOV", format!("{:.0}°", device.fov)));
    }
    if device.category.has_broadcast_radius() {
        lines.push(field("Coverage", format!("{:.0} px", geometry::BROADCAST_RADIUS)));
    }
    lines.push(field("Links", links.to_string()));
    if !device.notes.is_empty() {
        lines.push(field("Notes", device.notes.clone()));
    }
    lines.push(field("ID", device.id.to_string()));
    lines
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use sodo_core::{DiagramState, IdGenerator, Project};

    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn screen_with(project: Project, selected: Option<EntityId>) -> MapScreen {
        let mut screen = MapScreen::new(10.0, geometry::ROTATION_HANDLE_OFFSET);
        let view = View {
            project: Arc::new(project),
            state: DiagramState {
                selected,
                ..DiagramState::default()
            },
            read_only: false,
        };
        screen.update(&Action::Refresh(Arc::new(view))).unwrap();
        screen.canvas_area = Rect::new(0, 0, 80, 30);
        screen
    }

    fn one_camera() -> (Project, EntityId) {
        let ids = IdGenerator::new();
        let p = Project::default();
        let d = p.create_device(&ids, Point::new(100.0, 100.0));
        let id = d.id.clone();
        (p.add_device(d), id)
    }

    #[test]
    fn cell_maps_to_cell_centre() {
        let size = CanvasSize::new(800.0, 600.0);
        let area = Rect::new(2, 1, 80, 30);
        assert_eq!(cell_to_image(area, size, 2, 1), Some(Point::new(5.0, 10.0)));
        assert_eq!(cell_to_image(area, size, 81, 30), Some(Point::new(795.0, 590.0)));
        assert_eq!(cell_to_image(area, size, 1, 1), None);

        let shifted = CanvasSize {
            x: -400.0,
            y: -300.0,
            ..size
        };
        assert_eq!(cell_to_image(area, shifted, 2, 1), Some(Point::new(-395.0, -290.0)));
    }

    #[test]
    fn canvas_extent_follows_new_projects_only() {
        let (project, id) = one_camera();
        let project = Arc::new(project);
        let mut screen = MapScreen::new(10.0, geometry::ROTATION_HANDLE_OFFSET);
        let refresh = |project: &Arc<Project>, selected: Option<EntityId>| {
            Action::Refresh(Arc::new(View {
                project: Arc::clone(project),
                state: DiagramState {
                    selected,
                    ..DiagramState::default()
                },
                read_only: false,
            }))
        };
        screen.update(&refresh(&project, None)).unwrap();
        assert_eq!(screen.size(), canvas_size(&project));

        // Same project, new selection: the cached extent is kept.
        screen.size = CanvasSize::new(1.0, 1.0);
        screen.update(&refresh(&project, Some(id))).unwrap();
        assert_eq!(screen.size(), CanvasSize::new(1.0, 1.0));

        let ids = IdGenerator::new();
        let far = project.create_device(&ids, Point::new(-500.0, 2000.0));
        let moved = Arc::new(project.add_device(far));
        screen.update(&refresh(&moved, None)).unwrap();
        let size = screen.size();
        assert!(size.x < -500.0);
        assert!(size.bottom() > 2000.0);
    }

    #[test]
    fn pointer_reaches_devices_left_of_the_plan() {
        let ids = IdGenerator::new();
        let p = Project::default();
        let d = p.create_device(&ids, Point::new(-100.0, 50.0));
        let mut screen = screen_with(p.add_device(d), None);
        for _ in 0..30 {
            screen.handle_key_event(key(KeyCode::Left)).unwrap();
        }
        assert!(screen.pointer.x < -100.0);
    }

    #[test]
    fn enter_on_empty_canvas_clicks_canvas() {
        let mut screen = screen_with(Project::default(), None);
        let action = screen.handle_key_event(key(KeyCode::Enter)).unwrap();
        assert!(matches!(
            action,
            Some(Action::Diagram(DiagramAction::CanvasClick(p))) if p == Point::new(40.0, 40.0)
        ));
    }

    #[test]
    fn enter_on_device_clicks_device() {
        let (project, id) = one_camera();
        let mut screen = screen_with(project, None);
        screen.pointer = Point::new(105.0, 98.0);
        let action = screen.handle_key_event(key(KeyCode::Enter)).unwrap();
        assert!(matches!(action, Some(Action::Diagram(DiagramAction::DeviceClick(hit))) if hit == id));
    }

    #[test]
    fn pointer_stays_on_canvas() {
        let mut screen = screen_with(Project::default(), None);
        for _ in 0..10 {
            screen.handle_key_event(key(KeyCode::Left)).unwrap();
        }
        assert_eq!(screen.pointer.x, 0.0);
    }

    #[test]
    fn bracket_rotates_selected_camera() {
        let (project, id) = one_camera();
        let mut screen = screen_with(project, Some(id));
        let action = screen.handle_key_event(key(KeyCode::Char('['))).unwrap();
        match action {
            Some(Action::Diagram(DiagramAction::EditDevice(d))) => assert_eq!(d.rotation, -15.0),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn mouse_drag_runs_a_move_gesture() {
        let (project, id) = one_camera();
        let mut screen = screen_with(project, None);
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        screen.init(tx).unwrap();
        // 800×600 canvas over 80×30 cells: 10×20 image units per cell.
        let at = |kind, column, row| MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        };
        let down = screen
            .handle_mouse_event(at(MouseEventKind::Down(MouseButton::Left), 10, 5))
            .unwrap();
        assert!(matches!(down, Some(Action::Diagram(DiagramAction::DragStart(ref d))) if *d == id));
        assert!(matches!(
            rx.try_recv(),
            Ok(Action::Diagram(DiagramAction::DeviceClick(_)))
        ));
        let drag = screen
            .handle_mouse_event(at(MouseEventKind::Drag(MouseButton::Left), 20, 5))
            .unwrap();
        assert!(matches!(
            drag,
            Some(Action::Diagram(DiagramAction::DragMove(p))) if p == Point::new(200.0, 100.0)
        ));
        let up = screen
            .handle_mouse_event(at(MouseEventKind::Up(MouseButton::Left), 20, 5))
            .unwrap();
        assert!(matches!(up, Some(Action::Diagram(DiagramAction::DragEnd))));
    }
}
