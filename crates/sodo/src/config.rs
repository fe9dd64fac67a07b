//! CLI configuration: thin wrapper around `sodo_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--data-dir, --output, --color).

use std::path::PathBuf;

use clap::ValueEnum;

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use sodo_config::{Config, config_path, load_config, save_config};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Settings every handler needs, with flags layered over the config file.
#[derive(Debug)]
pub struct Context {
    pub config: Config,
    pub data_dir: PathBuf,
    pub output: OutputFormat,
    pub color: bool,
    pub quiet: bool,
    pub yes: bool,
    pub share: Option<String>,
}

impl Context {
    pub fn resolve(global: &GlobalOpts, config: Config) -> Result<Self, CliError> {
        let output = match global.output {
            Some(format) => format,
            None => parse_setting::<OutputFormat>("defaults.output", &config.defaults.output)?,
        };
        let color_mode = match global.color {
            Some(mode) => mode,
            None => parse_setting::<ColorMode>("defaults.color", &config.defaults.color)?,
        };
        let data_dir = global
            .data_dir
            .clone()
            .unwrap_or_else(|| config.data_dir());
        Ok(Self {
            data_dir,
            output,
            color: crate::output::should_color(color_mode),
            quiet: global.quiet,
            yes: global.yes,
            share: global.share.clone(),
            config,
        })
    }
}

fn parse_setting<T: ValueEnum>(field: &str, value: &str) -> Result<T, CliError> {
    T::from_str(value, true).map_err(|reason| CliError::Validation {
        field: field.into(),
        reason,
    })
}
