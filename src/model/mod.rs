//! # Embedding Provider Module
//!
//! Converts text into fixed-length dense vectors for the index.
//!
//! ## Key Components
//!
//! - `Embedder`: the provider contract, injected into the crawler and search
//! - `RateLimitedEmbedder`: any `rig` embedding model behind a `governor`
//!   limiter, with constructors for Ollama (`all-minilm`, 384 dimensions)
//!   and Gemini
//! - `HashingEmbedder`: deterministic model-free fallback
//! - `EmbeddingConversion` and blob/cosine helpers
//!
//! The dimension is fixed once the provider is constructed and must match the
//! collection the vectors are written to.

use std::future::Future;

pub mod embedding;
mod error;
mod hashing;
mod ratelimited_embedding;

pub use embedding::EmbeddingConversion;
pub use error::EmbedError;
pub use hashing::HashingEmbedder;
pub use ratelimited_embedding::{
    DEFAULT_OLLAMA_DIMENSIONS, DEFAULT_OLLAMA_MODEL, RateLimitedEmbedder,
};

/// Text to vector, deterministic for identical input
pub trait Embedder: Send + Sync {
    /// Output dimension of every vector this provider returns
    fn ndims(&self) -> usize;

    fn embed(&self, text: &str) -> impl Future<Output = Result<Vec<f32>, EmbedError>> + Send;
}

impl<T: Embedder> Embedder for &T {
    fn ndims(&self) -> usize {
        (**self).ndims()
    }

    fn embed(&self, text: &str) -> impl Future<Output = Result<Vec<f32>, EmbedError>> + Send {
        (**self).embed(text)
    }
}
