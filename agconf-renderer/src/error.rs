//! Error types for agconf-renderer.

use thiserror::Error;

/// All errors that can arise from template expansion or document rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Tera template engine error.
    #[error("template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// JSON serialization error (building tera context).
    #[error("context serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A reserved point-value key in a `repeat` map held a non-integer.
    #[error("repeat key \"{key}\" of \"{entity}\" must be an integer, got {value}")]
    InvalidOverride {
        entity: String,
        key: String,
        value: serde_json::Value,
    },
}
