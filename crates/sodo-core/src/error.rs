use thiserror::Error;

use crate::codec::CodecError;
use crate::floorplan::ImportError;

/// Errors surfaced by the core to CLI and TUI front ends.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("project is open read-only")]
    ReadOnly,

    #[error("{entity_type} '{identifier}' not found")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    #[error("validation failed: {message}")]
    ValidationFailed { message: String },

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl CoreError {
    pub fn device_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "device".into(),
            identifier: identifier.into(),
        }
    }

    pub fn connection_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "connection".into(),
            identifier: identifier.into(),
        }
    }
}
