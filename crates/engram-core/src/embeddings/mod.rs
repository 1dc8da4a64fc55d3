//! The embedding contract (§6) and its reference implementations. The core
//! never calls out to a concrete embedding backend directly — every
//! consumer takes a `&dyn EmbeddingProvider`.

mod hash;
#[cfg(feature = "embeddings")]
mod local;

pub use hash::HashEmbeddingProvider;
#[cfg(feature = "embeddings")]
pub use local::FastEmbedProvider;

use crate::error::Result;

/// `embed(text, timeout_ms) -> vector` (§6). Implementations own their own
/// timeout enforcement and must return `CoreError::EmbeddingUnavailable` on
/// provider error or deadline overrun — never panic, never block forever.
pub trait EmbeddingProvider: Send + Sync {
    fn embed(&self, text: &str, timeout_ms: u64) -> Result<Vec<f32>>;

    /// Fixed output dimensionality, used by the storage layer to validate
    /// `DimensionMismatch` before a save reaches the gate.
    fn dimensions(&self) -> usize;
}
