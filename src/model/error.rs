//! Error types for the embedding provider

use crate::error::Error as CrateError;
use thiserror::Error;

/// Error type for embedding operations
#[derive(Debug, Error)]
pub enum EmbedError {
    /// The underlying model call failed
    #[error("Embedding model error: {0}")]
    Model(#[from] rig::embeddings::EmbeddingError),

    /// The model answered without any vector
    #[error("Embedding model returned no vectors")]
    Empty,

    /// The vector length does not match the configured dimension
    #[error("Expected {expected} dimensions, got {actual}")]
    Dimension {
        /// Configured dimension
        expected: usize,
        /// Dimension the model produced
        actual: usize,
    },

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl From<EmbedError> for CrateError {
    fn from(err: EmbedError) -> Self {
        CrateError::EmbeddingUnavailable(err.to_string())
    }
}
