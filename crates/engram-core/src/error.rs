//! Error taxonomy for the cognitive memory engine.
//!
//! One enum per crate boundary, matching the kinds enumerated by the engine's
//! component design rather than exception names. `DuplicateRejected` and
//! `Contradiction` are deliberately *not* variants here — the gate treats
//! both as successful outcomes carried on [`crate::gate::GateDecision`].

use std::fmt;

/// Unified error type returned by every fallible operation in this crate.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CoreError {
    /// Scorer weights don't sum to 1.0, or an unknown memory type was referenced.
    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),

    /// Embedding provider returned an error or exceeded its deadline.
    #[error("embedding unavailable: {0}")]
    EmbeddingUnavailable(String),

    /// A storage transaction could not be committed after retrying.
    #[error("store conflict after {attempts} attempts: {source}")]
    StoreConflict {
        attempts: u32,
        #[source]
        source: Box<CoreError>,
    },

    /// A candidate embedding's dimensionality does not match the store's.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Underlying SQLite error.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Underlying filesystem error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A migration failed to apply.
    #[error("migration error: {0}")]
    Migration(String),

    /// A record referenced by id does not exist.
    #[error("record not found: {0}")]
    NotFound(String),

    /// A record id or other identifier was malformed.
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl CoreError {
    /// The CLI exit code this error maps to, per the engine's documented
    /// CLI surface. `DuplicateRejected` (exit 2) is not reachable from here
    /// since it is not an error — callers check [`crate::gate::Decision`] directly.
    pub fn exit_code(&self) -> i32 {
        match self {
            CoreError::EmbeddingUnavailable(_) => 10,
            CoreError::Database(_) | CoreError::StoreConflict { .. } | CoreError::Io(_) => 11,
            CoreError::ConfigInvalid(_) => 20,
            CoreError::DimensionMismatch { .. } => 11,
            CoreError::Migration(_) => 11,
            CoreError::NotFound(_) | CoreError::InvalidId(_) => 11,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Formats a value for inclusion in a user-visible error message without ever
/// leaking a raw embedding vector, per the propagation rule in the error
/// handling design ("never include raw embeddings").
pub fn redact_embedding(len: usize) -> impl fmt::Display {
    struct Redacted(usize);
    impl fmt::Display for Redacted {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "<embedding, {} dims>", self.0)
        }
    }
    Redacted(len)
}
