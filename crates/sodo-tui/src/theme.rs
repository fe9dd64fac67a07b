//! Palette and semantic styles.

use ratatui::style::{Color, Modifier, Style};
use sodo_core::{DeviceStatus, LinkMedium};

// ── Palette ───────────────────────────────────────────────────────────

pub const ACCENT: Color = Color::Rgb(16, 185, 129); // #10b981
pub const SKY: Color = Color::Rgb(59, 130, 246); // #3b82f6
pub const AMBER: Color = Color::Rgb(245, 158, 11); // #f59e0b
pub const ROSE: Color = Color::Rgb(244, 63, 94); // #f43f5e
pub const SLATE: Color = Color::Rgb(100, 116, 139); // #64748b
pub const VIOLET: Color = Color::Rgb(167, 139, 250); // #a78bfa
pub const TEXT: Color = Color::Rgb(203, 213, 225); // #cbd5e1
pub const BG_PANEL: Color = Color::Rgb(15, 23, 42); // #0f172a
pub const BG_HIGHLIGHT: Color = Color::Rgb(30, 41, 59); // #1e293b

// ── Diagram colours ───────────────────────────────────────────────────

/// Marker colour; matches the exported image.
pub fn status_color(status: DeviceStatus) -> Color {
    match status {
        DeviceStatus::Active => SKY,
        DeviceStatus::Maintenance => AMBER,
    }
}

pub fn link_color(medium: LinkMedium) -> Color {
    match medium {
        LinkMedium::Wired => SLATE,
        LinkMedium::Wireless => VIOLET,
    }
}

pub const COVERAGE: Color = Color::Rgb(51, 65, 85); // #334155
pub const WEDGE: Color = Color::Rgb(96, 165, 250); // #60a5fa
pub const SELECTION: Color = ACCENT;
pub const POINTER: Color = ROSE;

// ── Semantic styles ───────────────────────────────────────────────────

pub fn title_style() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

pub fn border_focused() -> Style {
    Style::default().fg(ACCENT)
}

pub fn border_default() -> Style {
    Style::default().fg(SLATE)
}

pub fn table_header() -> Style {
    Style::default()
        .fg(ACCENT)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
}

pub fn table_row() -> Style {
    Style::default().fg(TEXT)
}

pub fn table_selected() -> Style {
    Style::default()
        .fg(ACCENT)
        .bg(BG_HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

pub fn tab_active() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

pub fn tab_inactive() -> Style {
    Style::default().fg(TEXT)
}

pub fn key_hint() -> Style {
    Style::default().fg(SLATE)
}

pub fn key_hint_key() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

/// Read-only banner in the status bar.
pub fn read_only_badge() -> Style {
    Style::default()
        .fg(BG_PANEL)
        .bg(AMBER)
        .add_modifier(Modifier::BOLD)
}
