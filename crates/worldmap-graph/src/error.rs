//! Error types for the world map engine.

use thiserror::Error;

/// Errors surfaced by loading, ingestion and configuration.
///
/// Geometry problems (degenerate boxes, layout conflicts, oversize input)
/// are never errors; they are absorbed by padding, flagging and caps.
#[derive(Debug, Clone, Error)]
pub enum WorldMapError {
    /// Transport failure talking to the content API.
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// Content API answered with a non-success status.
    #[error("HTTP {0}")]
    Http(u16),

    /// Response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Invalid map configuration.
    #[error("invalid config: {0}")]
    Config(String),

    /// A data row failed validation.
    #[error("invalid {kind} row: {reason}")]
    InvalidRow { kind: &'static str, reason: String },

    /// The data source returned no rooms at all.
    #[error("world is empty")]
    EmptyWorld,
}

impl WorldMapError {
    /// Check if retrying the same request could succeed.
    pub fn is_recoverable(&self) -> bool {
        match self {
            WorldMapError::Fetch(_) => true,
            WorldMapError::Http(status) => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

pub type WorldMapResult<T> = Result<T, WorldMapError>;
