//! Error types for the crawler module

use crate::error::Error as CrateError;
use crate::index::StoreError;
use crate::model::EmbedError;
use thiserror::Error;

/// Error type for crawler operations
#[derive(Debug, Error)]
pub enum CrawlError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The configured base URL is not a valid URL
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Embedding failed for a single page
    #[error("Embedding error: {0}")]
    Embed(#[from] EmbedError),

    /// A store operation failed after its retries
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Too many store operations in a row failed; the index is considered down
    #[error("Store unavailable after {failures} consecutive failures: {last}")]
    StoreUnavailable { failures: u32, last: String },
}

impl CrawlError {
    /// Errors that end the whole crawl rather than a single entry
    pub fn is_fatal(&self) -> bool {
        matches!(self, CrawlError::StoreUnavailable { .. })
    }
}

impl From<CrawlError> for CrateError {
    fn from(err: CrawlError) -> Self {
        match err {
            CrawlError::Http(e) => CrateError::Http(e),
            CrawlError::UrlParse(e) => CrateError::Config(format!("invalid base URL: {}", e)),
            CrawlError::Embed(e) => e.into(),
            CrawlError::Store(e) => e.into(),
            CrawlError::StoreUnavailable { .. } => CrateError::StoreUnavailable(err.to_string()),
        }
    }
}
