//! Error types for the wikiatlas crate

use thiserror::Error;

/// Result type for wikiatlas operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for wikiatlas operations
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The embedding model could not produce a vector
    #[error("Embedding unavailable: {0}")]
    EmbeddingUnavailable(String),

    /// The vector index could not be reached or rejected an operation
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Search error
    #[error("Search error: {0}")]
    Search(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}
