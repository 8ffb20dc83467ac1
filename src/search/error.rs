//! # Search Error Types Module
//!
//! Failure modes of a filtered similarity query: the query could not be
//! embedded, the index rejected the search, or the request itself was
//! malformed.

use thiserror::Error;

use crate::error::Error as CrateError;
use crate::index::StoreError;
use crate::model::EmbedError;

/// Errors that can occur during search operations
#[derive(Debug, Error)]
pub enum SearchError {
    /// The query text could not be embedded
    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbedError),

    /// Error occurred in the vector index
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Invalid search parameters
    #[error("Invalid search parameters: {0}")]
    InvalidParameters(String),
}

impl From<SearchError> for CrateError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::Embedding(e) => e.into(),
            SearchError::Store(e) => e.into(),
            SearchError::InvalidParameters(_) => CrateError::Search(err.to_string()),
        }
    }
}
