//! Everything that flows through the app loop.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use sodo_core::{DiagramAction, DiagramState, EntityId, Project};

use crate::screen::ScreenId;

/// What screens draw from: the committed snapshot plus live interaction state.
#[derive(Debug, Clone, Default)]
pub struct View {
    pub project: Arc<Project>,
    pub state: DiagramState,
    pub read_only: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Error,
        }
    }

    pub fn warning(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Warning,
        }
    }

    pub fn info(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Info,
        }
    }
}

/// Text the path prompt collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    OpenFloorPlan,
    ExportJson,
    ExportPng,
    RenameProject,
}

impl PromptKind {
    pub fn title(self) -> &'static str {
        match self {
            Self::OpenFloorPlan => " Open floor plan (image or PDF) ",
            Self::ExportJson => " Export project JSON ",
            Self::ExportPng => " Export PNG ",
            Self::RenameProject => " Project name ",
        }
    }
}

/// Destructive operations wait for a `y`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteDevice { id: EntityId, name: String },
    DeleteConnection { id: EntityId, label: String },
    ResetProject,
}

impl ConfirmAction {
    pub fn into_diagram(self) -> DiagramAction {
        match self {
            Self::DeleteDevice { id, .. } => DiagramAction::DeleteDevice(id),
            Self::DeleteConnection { id, .. } => DiagramAction::DeleteConnection(id),
            Self::ResetProject => DiagramAction::ResetProject,
        }
    }
}

impl fmt::Display for ConfirmAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeleteDevice { name, .. } => write!(f, "Delete {name} and its connections?"),
            Self::DeleteConnection { label, .. } => write!(f, "Delete connection {label}?"),
            Self::ResetProject => f.write_str("Remove all devices, links and the floor plan?"),
        }
    }
}

/// Result of a background floor-plan import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedPlan {
    pub data_url: String,
    /// `1200x800`, or `unknown size` for embedded-only formats.
    pub size: String,
}

#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ─────────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── Navigation ────────────────────────────────────────────────
    SwitchScreen(ScreenId),
    NextScreen,
    PrevScreen,
    GoBack,
    ToggleHelp,

    // ── Diagram ───────────────────────────────────────────────────
    Refresh(Arc<View>),
    Diagram(DiagramAction),
    EditDevice(EntityId),
    ExitReadOnly,

    // ── Overlays ──────────────────────────────────────────────────
    OpenPrompt(PromptKind),
    PromptSubmitted(PromptKind, String),
    ShowConfirm(ConfirmAction),
    ConfirmYes,
    ConfirmNo,
    ShowShareLink,

    // ── Background work ───────────────────────────────────────────
    FloorPlanImported {
        path: PathBuf,
        result: Result<ImportedPlan, String>,
    },

    // ── Notifications ─────────────────────────────────────────────
    Notify(Notification),
    DismissNotification,
}
