//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and friends into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use sodo_config::ConfigError;
use sodo_core::{CodecError, CoreError, ImportError};
use sodo_render::RenderError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const READ_ONLY: i32 = 5;
    pub const IMPORT: i32 = 6;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(sodo::not_found),
        help("Run: sodo {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("{resource_type} name '{identifier}' is ambiguous")]
    #[diagnostic(
        code(sodo::ambiguous),
        help("Several devices share this name. Use the device ID instead.")
    )]
    Ambiguous {
        resource_type: String,
        identifier: String,
    },

    // ── Session ──────────────────────────────────────────────────────
    #[error("The project is open read-only from a share link")]
    #[diagnostic(
        code(sodo::read_only),
        help("Drop --share to edit your saved project instead.")
    )]
    ReadOnly,

    #[error("Operation '{action}' was not applied")]
    #[diagnostic(code(sodo::rejected))]
    Rejected { action: String, reason: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(sodo::validation))]
    Validation { field: String, reason: String },

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(sodo::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Files ────────────────────────────────────────────────────────
    #[error("Could not load floor plan from {path}")]
    #[diagnostic(
        code(sodo::import),
        help(
            "Supported formats: PNG, JPEG, GIF, WebP, BMP and PDF.\n\
             PDF pages are rasterized with pdftoppm (poppler-utils); set\n\
             import.pdftoppm in the config if it is not on PATH."
        )
    )]
    Import {
        path: String,
        #[source]
        source: ImportError,
    },

    #[error("Project file is not valid: {0}")]
    #[diagnostic(
        code(sodo::codec),
        help("Expected a JSON export produced by `sodo project export`.")
    )]
    Codec(#[from] CodecError),

    #[error(transparent)]
    #[diagnostic(code(sodo::render))]
    Render(#[from] RenderError),

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(sodo::config),
        help("Inspect the file with: sodo config show")
    )]
    Config(#[from] ConfigError),

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON output failed: {0}")]
    #[diagnostic(code(sodo::json))]
    Json(#[from] serde_json::Error),

    #[error("YAML output failed: {0}")]
    #[diagnostic(code(sodo::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::ReadOnly => exit_code::READ_ONLY,
            Self::Import { .. } => exit_code::IMPORT,
            Self::Validation { .. }
            | Self::Ambiguous { .. }
            | Self::Rejected { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ReadOnly => CliError::ReadOnly,

            CoreError::NotFound {
                entity_type,
                identifier,
            } => CliError::NotFound {
                list_command: format!("{entity_type}s list"),
                resource_type: entity_type,
                identifier,
            },

            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::Codec(e) => CliError::Codec(e),

            CoreError::Import(source) => CliError::Import {
                path: "(input)".into(),
                source,
            },

            CoreError::Storage(e) => CliError::Io(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_keep_their_exit_codes() {
        assert_eq!(CliError::from(CoreError::ReadOnly).exit_code(), 5);
        assert_eq!(
            CliError::from(CoreError::device_not_found("cam_1")).exit_code(),
            4
        );
        assert_eq!(
            CliError::from(CoreError::ValidationFailed {
                message: "bad".into()
            })
            .exit_code(),
            2
        );
        assert_eq!(CliError::from(CoreError::Import(ImportError::Busy)).exit_code(), 6);
    }

    #[test]
    fn not_found_points_at_the_list_command() {
        match CliError::from(CoreError::connection_not_found("conn_9")) {
            CliError::NotFound { list_command, .. } => {
                assert_eq!(list_command, "connections list");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
