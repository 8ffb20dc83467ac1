//! # Hashing Embedder
//!
//! A model-free `Embedder` that projects lowercase word tokens into a fixed
//! number of buckets with SHA-256 and L2-normalises the result. Texts that
//! share words end up close under cosine similarity, which is enough for
//! offline runs and tests without an embedding server.

use sha2::{Digest, Sha256};

use super::{EmbedError, Embedder};

#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    ndims: usize,
}

impl HashingEmbedder {
    pub fn new(ndims: usize) -> Self {
        Self {
            ndims: ndims.max(1),
        }
    }

    /// Synchronous form of `embed`, never fails
    pub fn vector(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.ndims];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let digest = Sha256::digest(token.to_lowercase().as_bytes());
            let mut bucket = [0u8; 8];
            bucket.copy_from_slice(&digest[..8]);
            let index = (u64::from_be_bytes(bucket) % self.ndims as u64) as usize;
            let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
            vector[index] += sign;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        vector
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(384)
    }
}

impl Embedder for HashingEmbedder {
    fn ndims(&self) -> usize {
        self.ndims
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        Ok(self.vector(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::embedding::cosine_similarity;

    #[tokio::test]
    async fn test_deterministic_and_fixed_dimension() {
        let embedder = HashingEmbedder::default();
        let a = embedder.embed("Blarney Castle").await.unwrap();
        let b = embedder.embed("Blarney Castle").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 384);
        assert_eq!(embedder.ndims(), 384);
    }

    #[test]
    fn test_shared_words_score_higher() {
        let embedder = HashingEmbedder::new(256);
        let query = embedder.vector("castle ruins");
        let castle = embedder.vector("Blarney Castle ruins in Cork");
        let beach = embedder.vector("Inch beach surfing");
        assert!(cosine_similarity(&query, &castle) > cosine_similarity(&query, &beach));
    }

    #[test]
    fn test_case_insensitive_and_empty_text() {
        let embedder = HashingEmbedder::new(64);
        assert_eq!(embedder.vector("Dublin"), embedder.vector("dublin"));
        assert!(embedder.vector("").iter().all(|v| *v == 0.0));
    }
}
