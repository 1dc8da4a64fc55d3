//! Test Data Factory
//!
//! Deterministic content generators plus a helper for backdating a saved
//! record's `last_review`, so decay/archival scenarios don't need to wait
//! out real wall-clock time.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use engram_core::embeddings::EmbeddingProvider;
use engram_core::error::Result;
use engram_core::model::RecordId;
use engram_core::storage::{StorageBackend, StorageTxn};

pub struct TestDataFactory;

/// An embedder that returns a pre-assigned vector for known inputs, falling
/// back to an all-zero vector for anything else. Lets a test pin exact
/// cosine similarities between two pieces of content instead of hoping a
/// real embedder happens to land in a particular gate band.
#[derive(Default)]
pub struct FixtureEmbedder {
    vectors: HashMap<String, Vec<f32>>,
    dims: usize,
}

impl FixtureEmbedder {
    pub fn new(dims: usize) -> Self {
        Self {
            vectors: HashMap::new(),
            dims,
        }
    }

    pub fn with(mut self, content: impl Into<String>, vector: Vec<f32>) -> Self {
        assert_eq!(vector.len(), self.dims, "fixture vector dimension mismatch");
        self.vectors.insert(content.into(), vector);
        self
    }
}

impl EmbeddingProvider for FixtureEmbedder {
    fn embed(&self, text: &str, _timeout_ms: u64) -> Result<Vec<f32>> {
        Ok(self
            .vectors
            .get(text)
            .cloned()
            .unwrap_or_else(|| vec![0.0; self.dims]))
    }

    fn dimensions(&self) -> usize {
        self.dims
    }
}

impl TestDataFactory {
    /// Rewinds `id`'s `last_review` (and, if earlier, `created_at`) by
    /// `days_ago`, leaving every other field untouched. Used to simulate
    /// time passing without sleeping in a test.
    pub fn backdate(storage: &dyn StorageBackend, id: &RecordId, days_ago: i64) -> Result<()> {
        storage.transaction(&mut |txn| {
            let mut record = txn
                .fetch_by_id(id)?
                .ok_or_else(|| engram_core::error::CoreError::NotFound(id.to_string()))?;
            let backdated = Utc::now() - Duration::days(days_ago);
            record.last_review = backdated;
            if record.created_at > backdated {
                record.created_at = backdated;
            }
            txn.update(&record)
        })
    }

    /// Sets `id`'s `last_review` to an explicit timestamp.
    pub fn set_last_review(storage: &dyn StorageBackend, id: &RecordId, at: DateTime<Utc>) -> Result<()> {
        storage.transaction(&mut |txn| {
            let mut record = txn
                .fetch_by_id(id)?
                .ok_or_else(|| engram_core::error::CoreError::NotFound(id.to_string()))?;
            record.last_review = at;
            txn.update(&record)
        })
    }

    /// Generates lorem-ipsum-like content of `words` length, deterministic
    /// across runs for a given `seed`.
    pub fn lorem_content(words: usize, seed: usize) -> String {
        const WORDS: [&str; 20] = [
            "the", "memory", "learning", "knowledge", "algorithm", "data", "system", "process",
            "function", "method", "class", "object", "variable", "constant", "type", "structure",
            "pattern", "design", "architecture", "code",
        ];
        (0..words)
            .map(|i| WORDS[(seed + i * 7) % WORDS.len()])
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::TestDatabaseManager;

    #[test]
    fn lorem_content_has_the_requested_word_count() {
        let content = TestDataFactory::lorem_content(10, 42);
        assert_eq!(content.split_whitespace().count(), 10);
    }

    #[test]
    fn backdate_moves_last_review_into_the_past() {
        let db = TestDatabaseManager::new_temp();
        let outcome = db.save("a memory to backdate", "Backdate me");
        TestDataFactory::backdate(&db.storage, &outcome.record_id, 90).unwrap();
        let record = db.storage.fetch_by_id(&outcome.record_id).unwrap().unwrap();
        let age_days = (Utc::now() - record.last_review).num_days();
        assert!(age_days >= 89);
    }
}
