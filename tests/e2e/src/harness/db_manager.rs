//! Test Database Manager
//!
//! Isolated SQLite-backed [`engram_core::storage::Storage`] instances for
//! end-to-end tests, automatically cleaned up via a `TempDir`.

use std::path::PathBuf;

use chrono::Utc;
use engram_core::classifier::ClassifyInput;
use engram_core::embeddings::{EmbeddingProvider, HashEmbeddingProvider};
use engram_core::model::{MemoryRecord, MemoryType, RecordId};
use engram_core::orchestrate::{self, SaveOutcome};
use engram_core::storage::{Storage, StorageBackend};
use tempfile::TempDir;

const EMBED_TIMEOUT_MS: u64 = 5_000;

/// Owns a temporary SQLite database plus a deterministic embedder, so a
/// whole test can drive `save`/`search` against real storage without
/// touching the platform data directory.
pub struct TestDatabaseManager {
    pub storage: Storage,
    pub embedder: HashEmbeddingProvider,
    _temp_dir: TempDir,
    db_path: PathBuf,
}

impl TestDatabaseManager {
    /// Create a new test database in a temporary directory.
    pub fn new_temp() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp directory");
        let db_path = temp_dir.path().join("test_engram.sqlite3");
        let storage = Storage::open(Some(db_path.clone())).expect("failed to open test storage");

        Self {
            storage,
            embedder: HashEmbeddingProvider::default(),
            _temp_dir: temp_dir,
            db_path,
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.db_path
    }

    /// Re-opens the same database file against a fresh `Storage`, exercising
    /// migration idempotency and confirming prior writes survive a reopen.
    pub fn reopen(&mut self) {
        self.storage = Storage::open(Some(self.db_path.clone())).expect("failed to reopen test storage");
    }

    /// Saves one piece of content through the full orchestration pipeline.
    pub fn save(&self, content: &str, title: &str) -> SaveOutcome {
        let input = ClassifyInput {
            file_path: None,
            content,
            title,
            trigger_phrases: &[],
        };
        orchestrate::save(&self.storage, &self.embedder, &input, None, EMBED_TIMEOUT_MS, Utc::now())
            .expect("save should succeed")
    }

    /// Seeds `count` distinct, unrelated declarative memories.
    pub fn seed_distinct(&self, count: usize) -> Vec<String> {
        (0..count)
            .map(|i| {
                let content = format!("distinct test memory content number {i} about topic {i}");
                self.save(&content, &format!("Memory {i}")).record_id.0.to_string()
            })
            .collect()
    }

    pub fn record_count(&self) -> usize {
        let embedding = self.embedder.embed("probe", EMBED_TIMEOUT_MS).unwrap();
        self.storage
            .nearest(&embedding, usize::MAX, false)
            .expect("nearest should succeed")
            .len()
    }

    pub fn memory_type_of(&self, id_hex: &str) -> MemoryType {
        let id = id_hex.parse().expect("valid record id");
        self.storage
            .fetch_by_id(&id)
            .expect("fetch should succeed")
            .expect("record should exist")
            .memory_type
    }

    /// Fetches a record by id, panicking if it doesn't exist. A thin
    /// convenience wrapper so individual tests don't repeat the
    /// `expect`/`expect` chain.
    pub fn storage_fetch(&self, id: &RecordId) -> MemoryRecord {
        self.storage
            .fetch_by_id(id)
            .expect("fetch should succeed")
            .expect("record should exist")
    }

    pub fn storage_nearest(&self, embedding: &[f32], k: usize, exclude_archived: bool) -> Vec<(MemoryRecord, f32)> {
        self.storage
            .nearest(embedding, k, exclude_archived)
            .expect("nearest should succeed")
    }

    pub fn embedder_embed(&self, text: &str) -> Vec<f32> {
        self.embedder.embed(text, EMBED_TIMEOUT_MS).expect("embed should succeed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_database_starts_empty() {
        let db = TestDatabaseManager::new_temp();
        assert_eq!(db.record_count(), 0);
        assert!(db.path().parent().unwrap().exists());
    }

    #[test]
    fn seed_distinct_creates_the_requested_count() {
        let db = TestDatabaseManager::new_temp();
        let ids = db.seed_distinct(5);
        assert_eq!(ids.len(), 5);
        assert_eq!(db.record_count(), 5);
    }

    #[test]
    fn reopen_preserves_previously_saved_records() {
        let mut db = TestDatabaseManager::new_temp();
        db.seed_distinct(3);
        db.reopen();
        assert_eq!(db.record_count(), 3);
    }
}
