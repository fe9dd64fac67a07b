//! Text encodings of a [`Project`].
//!
//! - **Persistence**: compact JSON written to the durable slot under [`PERSIST_KEY`].
//! - **Share links**: the same JSON, UTF-8 encoded, then standard Base64,
//!   appended to a page URL after [`SHARE_MARKER`].
//! - **File export**: pretty-printed JSON named after the project.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;
use url::Url;

use crate::model::Project;

/// Durable slot key. Files written by earlier releases use the same key.
pub const PERSIST_KEY: &str = "cctv_project_v2";

/// Fragment prefix that carries a shared project.
pub const SHARE_MARKER: &str = "#share=";

/// Prefix of exported diagram images.
pub const IMAGE_EXPORT_PREFIX: &str = "SODO_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("invalid project JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid share payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("share payload is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("no '{SHARE_MARKER}' fragment found")]
    MissingMarker,

    #[error("invalid base URL: {0}")]
    Url(#[from] url::ParseError),
}

// ── Persistence ─────────────────────────────────────────────────────

pub fn encode(project: &Project) -> Result<String, CodecError> {
    Ok(serde_json::to_string(project)?)
}

pub fn encode_pretty(project: &Project) -> Result<String, CodecError> {
    Ok(serde_json::to_string_pretty(project)?)
}

pub fn decode(text: &str) -> Result<Project, CodecError> {
    Ok(serde_json::from_str(text)?)
}

// ── Share links ─────────────────────────────────────────────────────

pub fn encode_share_payload(project: &Project) -> Result<String, CodecError> {
    Ok(STANDARD.encode(encode(project)?.as_bytes()))
}

pub fn decode_share_payload(payload: &str) -> Result<Project, CodecError> {
    let bytes = STANDARD.decode(payload.trim())?;
    let json = String::from_utf8(bytes)?;
    decode(&json)
}

/// `#share=<payload>`
pub fn share_fragment(project: &Project) -> Result<String, CodecError> {
    Ok(format!("{SHARE_MARKER}{}", encode_share_payload(project)?))
}

/// `base` with its fragment replaced by the share payload.
pub fn share_link(base: &Url, project: &Project) -> Result<Url, CodecError> {
    let mut link = base.clone();
    let fragment = share_fragment(project)?;
    link.set_fragment(Some(fragment.trim_start_matches('#')));
    Ok(link)
}

/// Payload part of a full link, a bare `#share=…` fragment, or `share=…`.
pub fn extract_share_payload(input: &str) -> Option<&str> {
    let marker = SHARE_MARKER.trim_start_matches('#');
    if let Some(idx) = input.find(SHARE_MARKER) {
        return Some(&input[idx + SHARE_MARKER.len()..]);
    }
    input.strip_prefix(marker)
}

/// Decode any of the shapes accepted by [`extract_share_payload`].
pub fn decode_share_link(input: &str) -> Result<Project, CodecError> {
    let payload = extract_share_payload(input.trim()).ok_or(CodecError::MissingMarker)?;
    decode_share_payload(payload)
}

// ── File names ──────────────────────────────────────────────────────

/// `<project name>.json`
pub fn export_file_name(project: &Project) -> String {
    format!("{}.json", file_stem(&project.name))
}

/// `SODO_<project name>.png`
pub fn image_file_name(project: &Project) -> String {
    format!("{IMAGE_EXPORT_PREFIX}{}.png", file_stem(&project.name))
}

fn file_stem(name: &str) -> String {
    let stem: String = name
        .trim()
        .chars()
        .map(|c| if matches!(c, '/' | '\\') || c.is_control() { '_' } else { c })
        .collect();
    if stem.is_empty() { "project".into() } else { stem }
}
