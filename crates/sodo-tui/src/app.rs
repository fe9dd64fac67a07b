//! Application core: owns the editor, routes input, draws the frame.
//!
//! Input events become [`Action`]s. Actions are queued on an unbounded
//! channel and drained after every event, so screens, overlays and
//! background tasks all feed the same loop. Every diagram change goes
//! through [`Editor::dispatch`]; screens only ever see the resulting
//! [`View`] snapshots.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs, Wrap},
};
use sodo_config::Config;
use sodo_core::{
    DiagramAction, Editor, Effect, FloorPlanImporter, ImportError, PdftoppmRasterizer,
    ProjectOrigin, codec,
};
use sodo_render::{EXPORT_SCALE, SceneOptions, render_png};
use throbber_widgets_tui::{Throbber, ThrobberState};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::action::{
    Action, ConfirmAction, ImportedPlan, Notification, NotificationLevel, PromptKind, View,
};
use crate::component::Component;
use crate::event::{Event, EventReader};
use crate::screen::ScreenId;
use crate::screens;
use crate::theme;
use crate::tui::Tui;
use crate::widgets::device_form::{DeviceForm, FormOutcome};
use crate::widgets::prompt::{Prompt, PromptOutcome};
use crate::widgets::{centered_rect, dialog};

const TICK_RATE: Duration = Duration::from_millis(100);
const RENDER_RATE: Duration = Duration::from_millis(33);
const NOTIFICATION_TTL: Duration = Duration::from_secs(4);

/// Modal layer on top of the active screen. It captures all key input.
enum Overlay {
    Help,
    Form(DeviceForm),
    Prompt(Prompt),
    Confirm(ConfirmAction),
    Share(String),
}

pub struct App {
    editor: Editor,
    config: Config,
    importer: Arc<FloorPlanImporter<PdftoppmRasterizer>>,
    active_screen: ScreenId,
    previous_screen: Option<ScreenId>,
    screens: HashMap<ScreenId, Box<dyn Component>>,
    running: bool,
    overlay: Option<Overlay>,
    notification: Option<(Notification, Instant)>,
    /// File currently being converted in the background.
    importing: Option<PathBuf>,
    throbber: ThrobberState,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
}

impl App {
    pub fn new(editor: Editor, config: Config) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let importer = FloorPlanImporter::new(
            PdftoppmRasterizer::new(config.import.pdftoppm.clone()),
            config.import.pdf_scale,
        );
        let screens = screens::create_screens(&config).into_iter().collect();
        Self {
            editor,
            config,
            importer: Arc::new(importer),
            active_screen: ScreenId::Map,
            previous_screen: None,
            screens,
            running: true,
            overlay: None,
            notification: None,
            importing: None,
            throbber: ThrobberState::default(),
            action_tx,
            action_rx,
        }
    }

    /// Queue a toast for the first frame.
    pub fn notify(&mut self, notification: Notification) {
        self.notification = Some((notification, Instant::now()));
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;
        let (width, height) = tui.size()?;
        debug!(width, height, "terminal ready");

        for screen in self.screens.values_mut() {
            screen.init(self.action_tx.clone())?;
        }
        self.refresh()?;

        let mut events = EventReader::new(TICK_RATE, RENDER_RATE);
        while self.running {
            let Some(event) = events.next().await else {
                break;
            };
            let action = match event {
                Event::Key(key) => self.handle_key_event(key)?,
                Event::Mouse(mouse) => self.handle_mouse_event(mouse)?,
                Event::Resize(w, h) => Some(Action::Resize(w, h)),
                Event::Tick => Some(Action::Tick),
                Event::Render => Some(Action::Render),
            };
            if let Some(action) = action {
                self.action_tx.send(action)?;
            }

            while let Ok(action) = self.action_rx.try_recv() {
                if matches!(action, Action::Render) {
                    tui.draw(|frame| self.render(frame))?;
                }
                self.process_action(action)?;
            }
        }

        events.stop();
        tui.exit();
        Ok(())
    }

    // ── Input ────────────────────────────────────────────────────────

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }
        if self.overlay.is_some() {
            return Ok(self.handle_overlay_key(key));
        }

        let global = match key.code {
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Char('?') => Some(Action::ToggleHelp),
            KeyCode::Char(c) if c.is_ascii_digit() => c
                .to_digit(10)
                .and_then(|d| u8::try_from(d).ok())
                .and_then(ScreenId::from_number)
                .map(Action::SwitchScreen),
            KeyCode::Tab => Some(Action::NextScreen),
            KeyCode::BackTab => Some(Action::PrevScreen),
            KeyCode::Char('o') => Some(Action::OpenPrompt(PromptKind::OpenFloorPlan)),
            KeyCode::Char('n') => Some(Action::OpenPrompt(PromptKind::RenameProject)),
            KeyCode::Char('s') => Some(Action::OpenPrompt(PromptKind::ExportJson)),
            KeyCode::Char('S') => Some(Action::OpenPrompt(PromptKind::ExportPng)),
            KeyCode::Char('p') => Some(Action::ShowShareLink),
            KeyCode::Char('x') => Some(Action::ExitReadOnly),
            KeyCode::Char('R') => Some(Action::ShowConfirm(ConfirmAction::ResetProject)),
            _ => None,
        };
        if global.is_some() {
            return Ok(global);
        }

        let delegated = match self.screens.get_mut(&self.active_screen) {
            Some(screen) => screen.handle_key_event(key)?,
            None => None,
        };
        if delegated.is_none() && key.code == KeyCode::Esc {
            if self.notification.is_some() {
                return Ok(Some(Action::DismissNotification));
            }
            return Ok(Some(Action::GoBack));
        }
        Ok(delegated)
    }

    fn handle_overlay_key(&mut self, key: KeyEvent) -> Option<Action> {
        let overlay = self.overlay.as_mut()?;
        match overlay {
            Overlay::Help => {
                matches!(key.code, KeyCode::Esc | KeyCode::Char('?' | 'q')).then_some(Action::ToggleHelp)
            }
            Overlay::Share(_) => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
                    self.overlay = None;
                }
                None
            }
            Overlay::Confirm(_) => match key.code {
                KeyCode::Char('y' | 'Y') => Some(Action::ConfirmYes),
                KeyCode::Char('n' | 'N') | KeyCode::Esc => Some(Action::ConfirmNo),
                _ => None,
            },
            Overlay::Prompt(prompt) => match prompt.handle_key(key) {
                PromptOutcome::Pending => None,
                PromptOutcome::Cancel => {
                    self.overlay = None;
                    None
                }
                PromptOutcome::Submit(value) => {
                    let kind = prompt.kind;
                    self.overlay = None;
                    Some(Action::PromptSubmitted(kind, value))
                }
            },
            Overlay::Form(form) => match form.handle_key(key) {
                FormOutcome::Pending => None,
                FormOutcome::Cancel => {
                    self.overlay = None;
                    None
                }
                FormOutcome::Invalid(message) => Some(Action::Notify(Notification::error(message))),
                FormOutcome::Submit(device) => {
                    self.overlay = None;
                    Some(Action::Diagram(DiagramAction::EditDevice(*device)))
                }
            },
        }
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        if self.overlay.is_some() {
            return Ok(None);
        }
        match self.screens.get_mut(&self.active_screen) {
            Some(screen) => screen.handle_mouse_event(mouse),
            None => Ok(None),
        }
    }

    // ── Actions ──────────────────────────────────────────────────────

    #[allow(clippy::too_many_lines)]
    fn process_action(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Quit => self.running = false,
            Action::Render | Action::Resize(..) | Action::Refresh(_) => {}
            Action::Tick => {
                if self
                    .notification
                    .as_ref()
                    .is_some_and(|(_, at)| at.elapsed() > NOTIFICATION_TTL)
                {
                    self.notification = None;
                }
                if self.importing.is_some() {
                    self.throbber.calc_next();
                }
            }

            Action::SwitchScreen(id) => self.switch_screen(id),
            Action::NextScreen => self.switch_screen(self.active_screen.next()),
            Action::PrevScreen => self.switch_screen(self.active_screen.prev()),
            Action::GoBack => {
                if let Some(prev) = self.previous_screen.take() {
                    self.switch_screen(prev);
                }
            }
            Action::ToggleHelp => {
                self.overlay = match self.overlay {
                    Some(Overlay::Help) => None,
                    _ => Some(Overlay::Help),
                };
            }

            Action::Diagram(diagram) => self.dispatch(diagram)?,
            Action::EditDevice(id) => {
                if self.guard_writable() {
                    if let Some(device) = self.editor.project().device(&id) {
                        self.overlay = Some(Overlay::Form(DeviceForm::new(device)));
                    }
                }
            }
            Action::ExitReadOnly => {
                if self.editor.is_read_only() {
                    self.editor.exit_read_only();
                    self.refresh()?;
                    let origin = match self.editor.origin() {
                        ProjectOrigin::Persisted => "your saved project",
                        _ => "a new project",
                    };
                    self.notify(Notification::success(format!("Now editing {origin}")));
                } else {
                    self.notify(Notification::info("This project is already editable"));
                }
            }

            Action::OpenPrompt(kind) => {
                let writes = matches!(kind, PromptKind::OpenFloorPlan | PromptKind::RenameProject);
                if !writes || self.guard_writable() {
                    let project = self.editor.project();
                    let initial = match kind {
                        PromptKind::OpenFloorPlan => String::new(),
                        PromptKind::ExportJson => codec::export_file_name(&project),
                        PromptKind::ExportPng => codec::image_file_name(&project),
                        PromptKind::RenameProject => project.name.clone(),
                    };
                    self.overlay = Some(Overlay::Prompt(Prompt::new(kind, initial)));
                }
            }
            Action::PromptSubmitted(kind, value) => match kind {
                PromptKind::OpenFloorPlan => self.start_import(expand_home(&value)),
                PromptKind::ExportJson => self.export_json(&expand_home(&value)),
                PromptKind::ExportPng => self.export_png(&expand_home(&value)),
                PromptKind::RenameProject => {
                    self.dispatch(DiagramAction::RenameProject(value))?;
                }
            },
            Action::ShowConfirm(confirm) => {
                if self.guard_writable() {
                    self.overlay = Some(Overlay::Confirm(confirm));
                }
            }
            Action::ConfirmYes => {
                if let Some(Overlay::Confirm(confirm)) = self.overlay.take() {
                    self.dispatch(confirm.into_diagram())?;
                }
            }
            Action::ConfirmNo => self.overlay = None,
            Action::ShowShareLink => self.show_share_link(),

            Action::FloorPlanImported { path, result } => {
                self.importing = None;
                match result {
                    Ok(plan) => {
                        info!(path = %path.display(), size = %plan.size, "floor plan imported");
                        self.dispatch(DiagramAction::SetFloorPlan(Some(plan.data_url)))?;
                        self.notify(Notification::success(format!(
                            "Floor plan loaded ({})",
                            plan.size
                        )));
                    }
                    Err(message) => self.notify(Notification::error(message)),
                }
            }

            Action::Notify(notification) => self.notify(notification),
            Action::DismissNotification => self.notification = None,
        }
        Ok(())
    }

    fn switch_screen(&mut self, id: ScreenId) {
        if id != self.active_screen {
            self.previous_screen = Some(self.active_screen);
            self.active_screen = id;
        }
    }

    /// `true` when edits are allowed; otherwise explain why not.
    fn guard_writable(&mut self) -> bool {
        if self.editor.is_read_only() {
            self.notify(Notification::warning("Shared project is read-only (x to edit)"));
            return false;
        }
        true
    }

    /// Run one diagram action through the editor and publish the result.
    fn dispatch(&mut self, action: DiagramAction) -> Result<()> {
        if action.is_mutating() && !self.guard_writable() {
            return Ok(());
        }
        let name = action.name();
        match self.editor.dispatch(action) {
            Ok(outcome) => {
                debug!(action = name, committed = outcome.committed, "dispatched");
                if let Some(Effect::OpenEditor(id)) = outcome.effect {
                    if let Some(device) = self.editor.project().device(&id) {
                        self.overlay = Some(Overlay::Form(DeviceForm::new(device)));
                    }
                }
            }
            Err(e) => {
                error!(action = name, error = %e, "dispatch failed");
                self.notify(Notification::error(e.to_string()));
            }
        }
        if let Some(e) = self.editor.store_mut().take_write_error() {
            self.notify(Notification::error(format!("Could not save project: {e}")));
        }
        self.refresh()
    }

    /// Push the current snapshot and interaction state to every screen.
    fn refresh(&mut self) -> Result<()> {
        let view = Arc::new(View {
            project: self.editor.project(),
            state: self.editor.state().clone(),
            read_only: self.editor.is_read_only(),
        });
        let action = Action::Refresh(view);
        for screen in self.screens.values_mut() {
            if let Some(follow_up) = screen.update(&action)? {
                self.action_tx.send(follow_up)?;
            }
        }
        Ok(())
    }

    // ── Files ────────────────────────────────────────────────────────

    /// Convert the file in the background. One import at a time.
    fn start_import(&mut self, path: PathBuf) {
        if self.importing.is_some() || self.importer.is_processing() {
            self.notify(Notification::error(ImportError::Busy.to_string()));
            return;
        }
        info!(path = %path.display(), "importing floor plan");
        self.importing = Some(path.clone());
        let importer = Arc::clone(&self.importer);
        let tx = self.action_tx.clone();
        let source = path.clone();
        let work = async move {
            importer
                .import_file(&source)
                .await
                .map(|plan| ImportedPlan {
                    size: plan.size_label(),
                    data_url: plan.data_url,
                })
                .map_err(|e| format!("{}: {e}", source.display()))
        };
        tokio::spawn(async move {
            let _ = tx.send(import_outcome(path, work).await);
        });
    }

    fn export_json(&mut self, path: &Path) {
        let result = codec::encode_pretty(&self.editor.project())
            .map_err(|e| e.to_string())
            .and_then(|json| std::fs::write(path, json).map_err(|e| e.to_string()));
        self.report_export(path, result);
    }

    fn export_png(&mut self, path: &Path) {
        let result = render_png(&self.editor.project(), &SceneOptions::default(), EXPORT_SCALE)
            .map_err(|e| e.to_string())
            .and_then(|png| std::fs::write(path, png).map_err(|e| e.to_string()));
        self.report_export(path, result);
    }

    fn report_export(&mut self, path: &Path, result: Result<(), String>) {
        match result {
            Ok(()) => {
                info!(path = %path.display(), "exported");
                self.notify(Notification::success(format!("Saved {}", path.display())));
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "export failed");
                self.notify(Notification::error(format!("Export failed: {e}")));
            }
        }
    }

    fn show_share_link(&mut self) {
        let project = self.editor.project();
        let link = self
            .config
            .share_base_url()
            .map_err(|e| e.to_string())
            .and_then(|base| codec::share_link(&base, &project).map_err(|e| e.to_string()));
        match link {
            Ok(url) => self.overlay = Some(Overlay::Share(url.to_string())),
            Err(e) => self.notify(Notification::error(format!("Cannot build share link: {e}"))),
        }
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let [content, tab_bar, status_bar] = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(area);

        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.render(frame, content);
        }
        self.render_tab_bar(frame, tab_bar);
        self.render_status_bar(frame, status_bar);

        if self.importing.is_some() {
            self.render_spinner(frame, content);
        }
        if let Some((notification, _)) = &self.notification {
            render_notification(frame, content, notification);
        }
        match &self.overlay {
            Some(Overlay::Help) => render_help(frame, area),
            Some(Overlay::Form(form)) => form.render(frame, area),
            Some(Overlay::Prompt(prompt)) => prompt.render(frame, area),
            Some(Overlay::Confirm(confirm)) => render_confirm(frame, area, confirm),
            Some(Overlay::Share(url)) => render_share(frame, area, url),
            None => {}
        }
    }

    fn render_tab_bar(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<Line> = ScreenId::ALL
            .iter()
            .map(|&id| {
                let style = if id == self.active_screen {
                    theme::tab_active()
                } else {
                    theme::tab_inactive()
                };
                Line::from(Span::styled(format!(" {} {} ", id.number(), id.label()), style))
            })
            .collect();
        let selected = ScreenId::ALL
            .iter()
            .position(|&s| s == self.active_screen)
            .unwrap_or(0);
        let tabs = Tabs::new(titles)
            .divider(Span::styled("│", theme::key_hint()))
            .select(selected);
        frame.render_widget(tabs, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let project = self.editor.project();
        let badge = if self.editor.is_read_only() {
            Span::styled(" READ-ONLY ", theme::read_only_badge())
        } else {
            let origin = match self.editor.origin() {
                ProjectOrigin::Persisted => "saved",
                ProjectOrigin::Default => "new",
                ProjectOrigin::Shared => "shared",
            };
            Span::styled(format!(" {origin} "), Style::default().fg(theme::ACCENT))
        };
        let hints = self
            .screens
            .get(&self.active_screen)
            .map_or("", |s| s.hints());
        let line = Line::from(vec![
            badge,
            Span::styled(
                format!(" {} · {} devices ", project.name, project.devices.len()),
                theme::table_row(),
            ),
            Span::styled(format!("│ {hints} │ ? help  q quit"), theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_spinner(&mut self, frame: &mut Frame, area: Rect) {
        let label = self.importing.as_ref().map_or_else(String::new, |p| {
            let name = p.file_name().map_or_else(
                || p.display().to_string(),
                |n| n.to_string_lossy().into_owned(),
            );
            format!(" Processing {name}…")
        });
        let width = u16::try_from(label.chars().count() + 6).unwrap_or(40).min(area.width);
        let rect = Rect::new(area.right().saturating_sub(width + 1), area.y + 1, width, 3);
        let inner = dialog(frame, rect, "", Style::default().fg(theme::AMBER));
        let throbber = Throbber::default()
            .label(label)
            .style(Style::default().fg(theme::TEXT))
            .throbber_style(Style::default().fg(theme::AMBER));
        frame.render_stateful_widget(throbber, inner, &mut self.throbber);
    }
}

// ── Overlays ──────────────────────────────────────────────────────────

fn render_notification(frame: &mut Frame, area: Rect, notification: &Notification) {
    let (color, icon) = match notification.level {
        NotificationLevel::Success => (theme::ACCENT, "✓"),
        NotificationLevel::Error => (theme::ROSE, "✗"),
        NotificationLevel::Warning => (theme::AMBER, "!"),
        NotificationLevel::Info => (theme::SKY, "·"),
    };
    let len = u16::try_from(notification.message.chars().count()).unwrap_or(u16::MAX);
    let width = len.saturating_add(6).clamp(20, 70).min(area.width);
    let rect = Rect::new(
        area.right().saturating_sub(width + 1),
        area.bottom().saturating_sub(4),
        width,
        3,
    );
    let inner = dialog(frame, rect, "", Style::default().fg(color));
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(format!(" {icon} "), Style::default().fg(color)),
            Span::styled(notification.message.as_str(), theme::table_row()),
        ])),
        inner,
    );
}

fn render_confirm(frame: &mut Frame, area: Rect, confirm: &ConfirmAction) {
    let rect = centered_rect(area, 56, 6);
    let inner = dialog(frame, rect, " Confirm ", Style::default().fg(theme::AMBER));
    let text = vec![
        Line::from(Span::styled(format!(" {confirm}"), theme::table_row())),
        Line::from(""),
        Line::from(vec![
            Span::styled(" y ", theme::key_hint_key()),
            Span::styled("confirm    ", theme::key_hint()),
            Span::styled("n ", theme::key_hint_key()),
            Span::styled("cancel", theme::key_hint()),
        ]),
    ];
    frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: false }), inner);
}

fn render_share(frame: &mut Frame, area: Rect, url: &str) {
    let rect = centered_rect(area, 80, 12);
    let inner = dialog(frame, rect, " Share link (read-only view) ", theme::border_focused());
    let text = vec![
        Line::from(Span::styled(url, Style::default().fg(theme::SKY))),
        Line::from(""),
        Line::from(Span::styled(
            "Open with: sodo-tui --share '<link>'   Esc to close",
            theme::key_hint(),
        )),
    ];
    frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: false }), inner);
}

fn render_help(frame: &mut Frame, area: Rect) {
    let rect = centered_rect(area, 62, 24);
    frame.render_widget(Clear, rect);
    let block = Block::default()
        .title(" Keyboard shortcuts ")
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_focused())
        .style(Style::default().bg(theme::BG_PANEL));
    let inner = block.inner(rect);
    frame.render_widget(block, rect);

    let section = |title: &'static str| {
        Line::from(Span::styled(format!(" {title}"), Style::default().fg(theme::ACCENT)))
    };
    let key = |keys: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {keys:<12}"), theme::key_hint_key()),
            Span::styled(what, theme::key_hint()),
        ])
    };
    let lines = vec![
        section("Map"),
        key("a / c", "Add device / connect mode"),
        key("arrows", "Move pointer"),
        key("Enter", "Click at pointer"),
        key("Shift+arrows", "Move selected device"),
        key("[ / ]", "Rotate selected camera"),
        key("e / d", "Edit / delete selected"),
        key("mouse", "Click, drag, drag the ◆ handle"),
        Line::from(""),
        section("Project"),
        key("o", "Open floor plan (image or PDF)"),
        key("n", "Rename project"),
        key("s / S", "Export JSON / PNG"),
        key("p", "Share link"),
        key("x", "Edit a shared project"),
        key("R", "Reset all data"),
        Line::from(""),
        section("Global"),
        key("1-3 / Tab", "Switch screen"),
        key("Esc", "Cancel / back"),
        key("? / q", "Help / quit"),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}

/// `~/x` → `$HOME/x`.
fn expand_home(raw: &str) -> PathBuf {
    match (raw.strip_prefix("~/"), std::env::var_os("HOME")) {
        (Some(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => PathBuf::from(raw),
    }
}

/// Run an import on its own task. A panicking import still yields a
/// result so the busy indicator is always cleared.
async fn import_outcome<F>(path: PathBuf, work: F) -> Action
where
    F: Future<Output = Result<ImportedPlan, String>> + Send + 'static,
{
    let result = match tokio::spawn(work).await {
        Ok(result) => result,
        Err(e) => {
            error!(path = %path.display(), error = %e, "floor plan import task failed");
            Err(format!("{}: import failed ({e})", path.display()))
        }
    };
    Action::FloorPlanImported { path, result }
}
