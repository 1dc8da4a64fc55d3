//! # Engram Core
//!
//! A cognitive memory engine: an FSRS-4.5 spaced-repetition scheduler, a
//! prediction-error admission gate that decides whether new content should
//! create, reinforce, merge with, or be rejected as a duplicate of existing
//! memory, attention-based retrievability decay, a composite multi-signal
//! scorer for ranked search, and a lazily-evaluated tier/lifecycle state
//! machine.
//!
//! ## Quick start
//!
//! ```rust
//! use engram_core::{embeddings::HashEmbeddingProvider, orchestrate, storage::InMemoryBackend};
//! use engram_core::classifier::ClassifyInput;
//! use chrono::Utc;
//!
//! let storage = InMemoryBackend::new();
//! let embedder = HashEmbeddingProvider::default();
//! let input = ClassifyInput {
//!     file_path: None,
//!     content: "the nightly deploy runs at 2am",
//!     title: "Deploy schedule",
//!     trigger_phrases: &[],
//! };
//! let outcome = orchestrate::save(&storage, &embedder, &input, None, 5000, Utc::now()).unwrap();
//! assert_eq!(outcome.decision, engram_core::model::Decision::Create);
//! ```
//!
//! ## Feature flags
//!
//! - `bundled-sqlite` (default): statically links SQLite via `rusqlite`'s
//!   `bundled` feature, so the crate builds without a system SQLite.
//! - `embeddings` (default): local ONNX embeddings via `fastembed`. Disable
//!   to drop that dependency entirely; [`embeddings::HashEmbeddingProvider`]
//!   remains available either way.
//! - `vector-search`: swaps the storage layer's brute-force cosine scan for
//!   a `usearch`-backed HNSW index, for stores too large to scan linearly.

#![warn(rustdoc::missing_crate_level_docs)]

pub mod classifier;
pub mod decay;
pub mod embeddings;
pub mod error;
pub mod fsrs;
pub mod gate;
pub mod model;
pub mod orchestrate;
pub mod scorer;
pub mod similarity;
pub mod storage;
pub mod tier;

pub use error::{CoreError, Result};
pub use model::{MemoryRecord, MemoryType, Rating, RecordId};

/// Commonly used items, for `use engram_core::prelude::*;`.
pub mod prelude {
    pub use crate::classifier::{classify, ClassifyInput, Classification};
    pub use crate::embeddings::EmbeddingProvider;
    pub use crate::error::{CoreError, Result};
    pub use crate::gate::GateDecision;
    pub use crate::model::{Decision, LifecycleState, MemoryRecord, MemoryType, Rating, RecordId};
    pub use crate::orchestrate::{save, search, SaveOutcome, SearchResult};
    pub use crate::scorer::ScoreWeights;
    pub use crate::storage::{StorageBackend, StorageTxn};
}
