//! Shared configuration for the sodo CLI and TUI.
//!
//! A single TOML file, layered as defaults ← `config.toml` ← `SODO_*`
//! environment variables (nested keys split on `__`, e.g.
//! `SODO_EDITOR__RANGE_POLICY=permissive`). Both binaries depend on this
//! crate; the CLI adds flag overrides on top.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use sodo_core::RangePolicy;

/// Overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "SODO_CONFIG";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration shared by CLI and TUI.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub storage: Storage,

    #[serde(default)]
    pub share: Share,

    #[serde(default)]
    pub editor: EditorSettings,

    #[serde(default)]
    pub import: ImportSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    /// table, json, json-compact, yaml or plain.
    #[serde(default = "default_output")]
    pub output: String,

    /// auto, always or never.
    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Storage {
    /// Directory holding the saved project. Platform data dir when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Share {
    /// Page that `#share=` fragments are appended to.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for Share {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    "https://sodo.local/".into()
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EditorSettings {
    /// Distance from device centre to the rotation handle, in image pixels.
    #[serde(default = "default_handle_offset")]
    pub handle_offset: f64,

    /// Pointer step for keyboard movement, in image pixels.
    #[serde(default = "default_nudge_step")]
    pub nudge_step: f64,

    #[serde(default)]
    pub range_policy: RangePolicy,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            handle_offset: default_handle_offset(),
            nudge_step: default_nudge_step(),
            range_policy: RangePolicy::default(),
        }
    }
}

fn default_handle_offset() -> f64 {
    sodo_core::geometry::ROTATION_HANDLE_OFFSET
}
fn default_nudge_step() -> f64 {
    10.0
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ImportSettings {
    /// `pdftoppm` executable used to rasterize PDF floor plans.
    #[serde(default = "default_pdftoppm")]
    pub pdftoppm: PathBuf,

    /// PDF render scale (2.0 = 144 DPI).
    #[serde(default = "default_pdf_scale")]
    pub pdf_scale: f64,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            pdftoppm: default_pdftoppm(),
            pdf_scale: default_pdf_scale(),
        }
    }
}

fn default_pdftoppm() -> PathBuf {
    PathBuf::from("pdftoppm")
}
fn default_pdf_scale() -> f64 {
    2.0
}

impl Config {
    pub fn share_base_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.share.base_url).map_err(|e| ConfigError::Validation {
            field: "share.base_url".into(),
            reason: e.to_string(),
        })
    }

    /// Effective data directory: configured value or the platform default.
    pub fn data_dir(&self) -> PathBuf {
        self.storage.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.share_base_url()?;
        if !(self.import.pdf_scale > 0.0 && self.import.pdf_scale <= 8.0) {
            return Err(ConfigError::Validation {
                field: "import.pdf_scale".into(),
                reason: format!("expected a value in (0, 8], got {}", self.import.pdf_scale),
            });
        }
        if self.editor.handle_offset <= 0.0 || self.editor.nudge_step <= 0.0 {
            return Err(ConfigError::Validation {
                field: "editor".into(),
                reason: "handle_offset and nudge_step must be positive".into(),
            });
        }
        Ok(())
    }
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "sodo", "sodo")
}

/// Resolve the config file path: `SODO_CONFIG`, else XDG / platform conventions.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    project_dirs().map_or_else(
        || dirs_fallback(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Platform data directory for the saved project.
pub fn default_data_dir() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".local/share"),
        |dirs| dirs.data_dir().to_path_buf(),
    )
}

fn dirs_fallback(sub: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(sub);
    p.push("sodo");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file, still layering `SODO_*` env on top.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("SODO_").split("__"))
        .extract()?;
    config.validate()?;
    Ok(config)
}

/// Load config, returning a default if the file is missing or invalid.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.defaults.output, "table");
        assert_eq!(cfg.editor.handle_offset, 45.0);
        assert_eq!(cfg.editor.range_policy, RangePolicy::Strict);
        assert_eq!(cfg.import.pdf_scale, 2.0);
        assert_eq!(cfg.share_base_url().unwrap().as_str(), "https://sodo.local/");
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[editor]\nrange_policy = \"permissive\"\nnudge_step = 25.0\n\n[storage]\ndata_dir = \"/srv/sodo\"\n",
        )
        .unwrap();
        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.editor.range_policy, RangePolicy::Permissive);
        assert_eq!(cfg.editor.nudge_step, 25.0);
        assert_eq!(cfg.editor.handle_offset, 45.0);
        assert_eq!(cfg.data_dir(), PathBuf::from("/srv/sodo"));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[share]\nbase_url = \"not a url\"\n").unwrap();
        assert!(matches!(load_config_from(&path), Err(ConfigError::Validation { .. })));

        std::fs::write(&path, "[import]\npdf_scale = 0.0\n").unwrap();
        assert!(matches!(load_config_from(&path), Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.defaults.output = "json".into();
        cfg.import.pdftoppm = PathBuf::from("/opt/poppler/bin/pdftoppm");
        save_config_to(&cfg, &path).unwrap();
        assert_eq!(load_config_from(&path).unwrap(), cfg);
    }
}
