use std::num::NonZeroU32;
use std::sync::Arc;

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use rig::embeddings::EmbeddingModel;
use rig::providers::{gemini, ollama};
use tracing::{Instrument, debug_span, info_span};

use super::embedding::EmbeddingConversion;
use super::{EmbedError, Embedder};

/// Embedding model served by Ollama that matches the 384 dimension index layout
pub const DEFAULT_OLLAMA_MODEL: &str = "all-minilm";
pub const DEFAULT_OLLAMA_DIMENSIONS: usize = 384;

/// Any `rig` embedding model, optionally throttled by a `governor` limiter
#[derive(Clone)]
pub struct RateLimitedEmbedder<M: EmbeddingModel> {
    model: M,
    limiter: Option<Arc<DefaultDirectRateLimiter>>,
}

impl<M> RateLimitedEmbedder<M>
where
    M: EmbeddingModel,
{
    pub fn new(model: M) -> Self {
        Self {
            model,
            limiter: None,
        }
    }

    pub fn with_limiter(mut self, limiter: DefaultDirectRateLimiter) -> Self {
        self.limiter = Some(Arc::new(limiter));
        self
    }

    /// Throttle to `per_minute` embedding calls
    pub fn per_minute(self, per_minute: u32) -> Self {
        match NonZeroU32::new(per_minute) {
            Some(quota) => self.with_limiter(RateLimiter::direct(Quota::per_minute(quota))),
            None => self,
        }
    }
}

impl RateLimitedEmbedder<ollama::EmbeddingModel> {
    /// Sentence embeddings from a local Ollama server
    pub fn ollama(base_url: &str, model: &str, ndims: usize) -> Self {
        let client = ollama::Client::from_url(base_url);
        Self::new(client.embedding_model_with_ndims(model, ndims))
    }
}

impl RateLimitedEmbedder<gemini::embedding::EmbeddingModel> {
    pub fn gemini(api_key: &str) -> Self {
        let client = gemini::Client::new(api_key);
        Self::new(client.embedding_model(gemini::embedding::EMBEDDING_004)).per_minute(1000)
    }
}

impl<M: EmbeddingModel> Embedder for RateLimitedEmbedder<M> {
    fn ndims(&self) -> usize {
        self.model.ndims()
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().instrument(debug_span!("limiter")).await;
        }
        let embeddings = self
            .model
            .embed_texts(vec![text.to_string()])
            .instrument(info_span!("embed_texts"))
            .await?;
        let vector = embeddings
            .first()
            .map(EmbeddingConversion::to_vec)
            .ok_or(EmbedError::Empty)?;

        let expected = self.ndims();
        if expected != 0 && vector.len() != expected {
            return Err(EmbedError::Dimension {
                expected,
                actual: vector.len(),
            });
        }
        Ok(vector)
    }
}
