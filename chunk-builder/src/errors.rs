//! Unified error types for the crate.

use thiserror::Error;

/// Top-level error for chunk-builder operations.
#[derive(Debug, Error)]
pub enum ChunkError {
    /// I/O or filesystem errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing / serialization errors.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Invalid or unsupported configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Mismatch in embedding dimensionality across sentences.
    #[error("vector size mismatch: got {got}, want {want}")]
    VectorSizeMismatch { got: usize, want: usize },

    /// Embedding provider failures (wrapped).
    #[error("embedding error: {0}")]
    Embedding(#[from] llm_service::LlmError),
}
