//! Component trait shared by every screen.

use color_eyre::eyre::Result;
use crossterm::event::{KeyEvent, MouseEvent};
use ratatui::{Frame, layout::Rect};
use tokio::sync::mpsc::UnboundedSender;

use crate::action::Action;

/// Lifecycle: `init` → (`handle_key_event` | `handle_mouse_event` | `update` | `render`)*
///
/// Components never touch the project directly. They read the snapshot
/// and diagram state pushed to them through [`Action::Refresh`] and answer
/// input with actions for the app loop.
pub trait Component: Send {
    /// Called once when the component is mounted. Keep the sender to emit
    /// more than one action per input event.
    fn init(&mut self, _action_tx: UnboundedSender<Action>) -> Result<()> {
        Ok(())
    }

    fn handle_key_event(&mut self, _key: KeyEvent) -> Result<Option<Action>> {
        Ok(None)
    }

    fn handle_mouse_event(&mut self, _mouse: MouseEvent) -> Result<Option<Action>> {
        Ok(None)
    }

    /// Process a dispatched action. May return a follow-up action.
    fn update(&mut self, _action: &Action) -> Result<Option<Action>> {
        Ok(None)
    }

    /// `&mut` so screens can remember their last layout for mouse hit tests.
    fn render(&mut self, frame: &mut Frame, area: Rect);

    /// Key hints shown in the status bar while this screen is active.
    fn hints(&self) -> &'static str {
        ""
    }
}
