//! Report screen: bill of materials.

use std::sync::Arc;

use color_eyre::eyre::Result;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Row, Table},
};
use sodo_core::report::EMPTY_BOM_LABEL;
use sodo_core::{BomLine, compute_bom};

use crate::action::{Action, View};
use crate::component::Component;
use crate::theme;

pub struct ReportScreen {
    view: Arc<View>,
    bom: Vec<BomLine>,
}

impl ReportScreen {
    pub fn new() -> Self {
        Self {
            view: Arc::new(View::default()),
            bom: Vec::new(),
        }
    }
}

impl Component for ReportScreen {
    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        if let Action::Refresh(view) = action {
            if !Arc::ptr_eq(&self.view.project, &view.project) {
                self.bom = compute_bom(&view.project);
            }
            self.view = Arc::clone(view);
        }
        Ok(None)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let project = &self.view.project;
        let block = Block::default()
            .title(format!(" Bill of materials · {} ", project.name))
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.bom.is_empty() {
            let [_, middle, _] = Layout::vertical([
                Constraint::Fill(1),
                Constraint::Length(1),
                Constraint::Fill(1),
            ])
            .areas(inner);
            frame.render_widget(
                Paragraph::new(Span::styled(EMPTY_BOM_LABEL, theme::key_hint()))
                    .alignment(Alignment::Center),
                middle,
            );
            return;
        }

        let [table_area, totals_area] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(inner);
        let rows = self.bom.iter().map(|line| {
            Row::new(vec![
                line.category.label().to_owned(),
                line.category.slug().to_owned(),
                line.count.to_string(),
            ])
            .style(theme::table_row())
        });
        let table = Table::new(
            rows,
            [Constraint::Fill(2), Constraint::Fill(1), Constraint::Length(8)],
        )
        .header(Row::new(["Type", "Slug", "Qty"]).style(theme::table_header()));
        frame.render_widget(table, table_area);

        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled("Devices ", theme::key_hint()),
                Span::styled(project.devices.len().to_string(), theme::key_hint_key()),
                Span::styled("   Connections ", theme::key_hint()),
                Span::styled(project.connections.len().to_string(), theme::key_hint_key()),
            ])),
            totals_area,
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ratatui::{Terminal, backend::TestBackend};
    use sodo_core::Project;

    use super::*;

    fn rendered(screen: &mut ReportScreen) -> String {
        let mut terminal = Terminal::new(TestBackend::new(60, 8)).unwrap();
        terminal.draw(|f| screen.render(f, f.area())).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer.content().iter().map(ratatui::buffer::Cell::symbol).collect()
    }

    #[test]
    fn empty_project_shows_no_devices_label() {
        let mut screen = ReportScreen::new();
        screen
            .update(&Action::Refresh(Arc::new(View {
                project: Arc::new(Project::default()),
                ..View::default()
            })))
            .unwrap();
        assert!(rendered(&mut screen).contains(EMPTY_BOM_LABEL));
    }
}
