//! A deterministic, dependency-free embedding provider used whenever the
//! `embeddings` feature is off and by every unit test in this crate,
//! regardless of feature flags — so gate/scorer math is exercised without a
//! model download or a network call. Not a quality embedding: it is a
//! reproducible hashed bag-of-tokens projection, nothing more.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use super::EmbeddingProvider;
use crate::error::Result;

pub struct HashEmbeddingProvider {
    dimensions: usize,
}

impl HashEmbeddingProvider {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }
}

impl Default for HashEmbeddingProvider {
    fn default() -> Self {
        Self::new(256)
    }
}

impl EmbeddingProvider for HashEmbeddingProvider {
    fn embed(&self, text: &str, _timeout_ms: u64) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dimensions];
        for token in text.to_ascii_lowercase().split_whitespace() {
            let mut hasher = DefaultHasher::new();
            token.hash(&mut hasher);
            let h = hasher.finish();
            let bucket = (h as usize) % self.dimensions;
            let sign = if (h >> 63) & 1 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }
        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        } else {
            // Empty/whitespace-only text: seed a stable unit vector rather
            // than returning all-zeros, which would make every such input
            // indistinguishable under cosine similarity (undefined, not 0).
            vector[0] = 1.0;
        }
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
