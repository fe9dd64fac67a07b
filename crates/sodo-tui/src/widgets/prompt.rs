//! Single-line prompt for file paths and the project name.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Position, Rect},
    text::{Line, Span},
    widgets::Paragraph,
};
use tui_input::Input;

use crate::action::PromptKind;
use crate::theme;

use super::{centered_rect, dialog, input_request};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    Pending,
    Cancel,
    Submit(String),
}

#[derive(Debug)]
pub struct Prompt {
    pub kind: PromptKind,
    input: Input,
}

impl Prompt {
    pub fn new(kind: PromptKind, initial: impl Into<String>) -> Self {
        Self {
            kind,
            input: Input::new(initial.into()),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> PromptOutcome {
        match key.code {
            KeyCode::Esc => PromptOutcome::Cancel,
            KeyCode::Enter => {
                let value = self.input.value().trim();
                if value.is_empty() {
                    PromptOutcome::Pending
                } else {
                    PromptOutcome::Submit(value.to_owned())
                }
            }
            _ => {
                if let Some(req) = input_request(key) {
                    self.input.handle(req);
                }
                PromptOutcome::Pending
            }
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let rect = centered_rect(area, 64, 5);
        let inner = dialog(frame, rect, self.kind.title(), theme::border_focused());
        frame.render_widget(
            Paragraph::new(Span::styled("> ", theme::key_hint_key())),
            Rect::new(inner.x, inner.y, 2, 1),
        );
        let field = Rect::new(inner.x + 2, inner.y, inner.width.saturating_sub(2), 1);
        let scroll = self.input.visual_scroll(usize::from(field.width.max(1)));
        frame.render_widget(
            Paragraph::new(Span::styled(self.input.value(), theme::table_row()))
                .scroll((0, u16::try_from(scroll).unwrap_or(0))),
            field,
        );
        let cursor = self.input.visual_cursor().saturating_sub(scroll);
        frame.set_cursor_position(Position::new(
            field.x + u16::try_from(cursor).unwrap_or(0),
            field.y,
        ));

        let hints = Rect::new(inner.x, inner.y + 2, inner.width, 1);
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled("Enter ", theme::key_hint_key()),
                Span::styled("accept   ", theme::key_hint()),
                Span::styled("Esc ", theme::key_hint_key()),
                Span::styled("cancel", theme::key_hint()),
            ])),
            hints,
        );
    }
}
