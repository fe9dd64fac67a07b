//! Inventory screen: every device and every connection as tables.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::Span,
    widgets::{Block, BorderType, Borders, Cell, Row, Table, TableState},
};
use sodo_core::DiagramAction;
use tokio::sync::mpsc::UnboundedSender;

use crate::action::{Action, ConfirmAction, View};
use crate::component::Component;
use crate::screen::ScreenId;
use crate::theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pane {
    Devices,
    Connections,
}

pub struct InventoryScreen {
    view: Arc<View>,
    action_tx: Option<UnboundedSender<Action>>,
    pane: Pane,
    devices: TableState,
    connections: TableState,
}

impl InventoryScreen {
    pub fn new() -> Self {
        Self {
            view: Arc::new(View::default()),
            action_tx: None,
            pane: Pane::Devices,
            devices: TableState::default().with_selected(Some(0)),
            connections: TableState::default().with_selected(Some(0)),
        }
    }

    fn len(&self, pane: Pane) -> usize {
        match pane {
            Pane::Devices => self.view.project.devices.len(),
            Pane::Connections => self.view.project.connections.len(),
        }
    }

    fn table_mut(&mut self, pane: Pane) -> &mut TableState {
        match pane {
            Pane::Devices => &mut self.devices,
            Pane::Connections => &mut self.connections,
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.len(self.pane);
        let table = self.table_mut(self.pane);
        if len == 0 {
            table.select(None);
            return;
        }
        let current = table.selected().unwrap_or(0);
        let next = current.saturating_add_signed(delta).min(len - 1);
        table.select(Some(next));
    }

    /// Keep both cursors inside their lists after the project changes.
    fn clamp_selections(&mut self) {
        for pane in [Pane::Devices, Pane::Connections] {
            let len = self.len(pane);
            let table = self.table_mut(pane);
            let selected = match (len, table.selected()) {
                (0, _) => None,
                (n, Some(i)) => Some(i.min(n - 1)),
                (_, None) => Some(0),
            };
            table.select(selected);
        }
    }

    fn activate(&self) -> Option<Action> {
        let project = &self.view.project;
        match self.pane {
            Pane::Devices => {
                let device = project.devices.get(self.devices.selected()?)?;
                if let Some(tx) = &self.action_tx {
                    let _ = tx.send(Action::Diagram(DiagramAction::Select(Some(device.id.clone()))));
                }
                Some(Action::SwitchScreen(ScreenId::Map))
            }
            Pane::Connections => None,
        }
    }

    fn edit(&self) -> Option<Action> {
        let device = self.view.project.devices.get(self.devices.selected()?)?;
        (self.pane == Pane::Devices).then(|| Action::EditDevice(device.id.clone()))
    }

    fn delete(&self) -> Option<Action> {
        let project = &self.view.project;
        let confirm = match self.pane {
            Pane::Devices => {
                let d = project.devices.get(self.devices.selected()?)?;
                ConfirmAction::DeleteDevice {
                    id: d.id.clone(),
                    name: d.name.clone(),
                }
            }
            Pane::Connections => {
                let c = project.connections.get(self.connections.selected()?)?;
                ConfirmAction::DeleteConnection {
                    id: c.id.clone(),
                    label: project.connection_label(c),
                }
            }
        };
        Some(Action::ShowConfirm(confirm))
    }

    fn block(&self, title: String, pane: Pane) -> Block<'static> {
        Block::default()
            .title(title)
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.pane == pane {
                theme::border_focused()
            } else {
                theme::border_default()
            })
    }
}

impl Component for InventoryScreen {
    fn init(&mut self, action_tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(action_tx);
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_selection(1);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_selection(-1);
                None
            }
            KeyCode::Char('h' | 'l') | KeyCode::Left | KeyCode::Right => {
                self.pane = match self.pane {
                    Pane::Devices => Pane::Connections,
                    Pane::Connections => Pane::Devices,
                };
                None
            }
            KeyCode::Enter => self.activate(),
            KeyCode::Char('e') => self.edit(),
            KeyCode::Char('d') | KeyCode::Delete => self.delete(),
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        if let Action::Refresh(view) = action {
            self.view = Arc::clone(view);
            self.clamp_selections();
        }
        Ok(None)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let [top, bottom] =
            Layout::vertical([Constraint::Percentage(60), Constraint::Percentage(40)]).areas(area);
        let view = Arc::clone(&self.view);
        let project = &view.project;
        let selected_id = view.state.selected.as_ref();

        let device_rows = project.devices.iter().map(|d| {
            let marker = if Some(&d.id) == selected_id { "●" } else { " " };
            Row::new(vec![
                Cell::from(Span::styled(marker, Style::default().fg(theme::SELECTION))),
                Cell::from(d.name.clone()),
                Cell::from(d.category.label()),
                Cell::from(Span::styled(
                    d.status.label(),
                    Style::default().fg(theme::status_color(d.status)),
                )),
                Cell::from(d.ip.clone()),
                Cell::from(format!("{:.0}, {:.0}", d.x, d.y)),
            ])
            .style(theme::table_row())
        });
        let devices = Table::new(
            device_rows,
            [
                Constraint::Length(1),
                Constraint::Fill(2),
                Constraint::Length(14),
                Constraint::Length(10),
                Constraint::Length(16),
                Constraint::Length(11),
            ],
        )
        .header(
            Row::new(["", "Name", "Type", "Status", "IP", "Position"]).style(theme::table_header()),
        )
        .row_highlight_style(theme::table_selected())
        .block(self.block(format!(" Devices ({}) ", project.devices.len()), Pane::Devices));
        frame.render_stateful_widget(devices, top, &mut self.devices);

        let connection_rows = project.connections.iter().map(|c| {
            Row::new(vec![
                Cell::from(project.connection_label(c)),
                Cell::from(Span::styled(
                    c.medium.slug(),
                    Style::default().fg(theme::link_color(c.medium)),
                )),
                Cell::from(c.label.clone().unwrap_or_default()),
            ])
            .style(theme::table_row())
        });
        let connections = Table::new(
            connection_rows,
            [Constraint::Fill(3), Constraint::Length(10), Constraint::Fill(1)],
        )
        .header(Row::new(["Link", "Type", "Label"]).style(theme::table_header()))
        .row_highlight_style(theme::table_selected())
        .block(self.block(
            format!(" Connections ({}) ", project.connections.len()),
            Pane::Connections,
        ));
        frame.render_stateful_widget(connections, bottom, &mut self.connections);
    }

    fn hints(&self) -> &'static str {
        "j/k move  h/l switch table  Enter show on map  e edit  d delete"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use sodo_core::{IdGenerator, Point, Project};

    use super::*;

    fn linked_pair() -> Project {
        let ids = IdGenerator::new();
        let p = Project::default();
        let a = p.create_device(&ids, Point::new(0.0, 0.0));
        let p = p.add_device(a.clone());
        let b = p.create_device(&ids, Point::new(50.0, 0.0));
        let p = p.add_device(b.clone());
        let c = p.create_connection(&ids, a.id, b.id).unwrap();
        p.add_connection(c)
    }

    fn screen(project: Project) -> InventoryScreen {
        let mut s = InventoryScreen::new();
        let view = View {
            project: Arc::new(project),
            ..View::default()
        };
        s.update(&Action::Refresh(Arc::new(view))).unwrap();
        s
    }

    #[test]
    fn delete_on_connections_pane_confirms_connection() {
        let project = linked_pair();
        let conn = project.connections[0].id.clone();
        let mut s = screen(project);
        s.handle_key_event(KeyEvent::from(KeyCode::Right)).unwrap();
        let action = s.handle_key_event(KeyEvent::from(KeyCode::Char('d'))).unwrap();
        assert!(matches!(
            action,
            Some(Action::ShowConfirm(ConfirmAction::DeleteConnection { id, label }))
                if id == conn && label == "Thiết bị 1 → Thiết bị 2"
        ));
    }

    #[test]
    fn selection_is_clamped_after_shrink() {
        let mut s = screen(linked_pair());
        s.handle_key_event(KeyEvent::from(KeyCode::Down)).unwrap();
        assert_eq!(s.devices.selected(), Some(1));
        s.update(&Action::Refresh(Arc::new(View::default()))).unwrap();
        assert_eq!(s.devices.selected(), None);
    }
}
