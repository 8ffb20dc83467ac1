//! # Vector Store Error Types
//!
//! Error types shared by every `VectorStore` backend.
//!
//! ## Key Components
//!
//! - `StoreError`: HTTP/API failures from the Qdrant backend, libsql failures
//!   from the local backend, schema mismatches and undecodable records
//!
//! Every variant converts into the crate's `StoreUnavailable` error so that the
//! crawler and the binary can tell an index outage apart from a per-page
//! problem.

use crate::error::Error as CrateError;
use thiserror::Error;

/// Error type for vector store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// Transport level failure talking to the index
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The index answered with a non-success status
    #[error("Index API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Message extracted from the response body
        message: String,
    },

    /// LibSQL error
    #[error("LibSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// SQL query error
    #[error("SQL query error: {0}")]
    Query(String),

    /// Collection layout does not match what this process expects
    #[error("Schema error: {0}")]
    Schema(String),

    /// A stored record could not be decoded
    #[error("Data error: {0}")]
    Data(String),

    /// Connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Payload (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<StoreError> for CrateError {
    fn from(err: StoreError) -> Self {
        CrateError::StoreUnavailable(err.to_string())
    }
}
