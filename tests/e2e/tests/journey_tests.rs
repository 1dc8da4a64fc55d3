//! Full save → gate → reinforce/merge/create → search → testing-effect
//! journeys against a real SQLite-backed store.

use std::sync::Arc;
use std::thread;

use chrono::Utc;

use engram_core::classifier::ClassifyInput;
use engram_core::embeddings::EmbeddingProvider;
use engram_core::error::CoreError;
use engram_core::model::Decision;
use engram_core::orchestrate;
use engram_core::scorer::ScoreWeights;
use engram_core::storage::StorageBackend;

use engram_e2e_tests::harness::TestDatabaseManager;
use engram_e2e_tests::mocks::FixtureEmbedder;

#[test]
fn first_save_creates_second_and_third_identical_saves_reject_as_duplicates() {
    let db = TestDatabaseManager::new_temp();
    let content = "the on-call rotation changes every Monday at 9am";

    let first = db.save(content, "On-call rotation");
    assert_eq!(first.decision, Decision::Create);

    // Byte-identical resubmissions land in the DUPLICATE gate band every
    // time, not just on the first repeat.
    let second = db.save(content, "On-call rotation");
    assert_eq!(second.decision, Decision::RejectAsDuplicate);
    assert_eq!(second.record_id, first.record_id);

    let third = db.save(content, "On-call rotation");
    assert_eq!(third.decision, Decision::RejectAsDuplicate);
    assert_eq!(third.record_id, first.record_id);
}

#[test]
fn contradictory_high_similarity_content_creates_a_new_record_and_flags_a_conflict() {
    let db = TestDatabaseManager::new_temp();
    // Two unit vectors at ~23 degrees apart: cosine similarity lands in
    // [HIGH_MATCH, DUPLICATE), the MERGE-vs-REINFORCE-vs-duplicate band
    // that only differs on whether the text contradicts.
    let a_vec = vec![1.0, 0.0];
    let b_vec = vec![0.92, 0.39192];

    let embedder = FixtureEmbedder::new(2)
        .with("the deploy pipeline requires manual approval", a_vec)
        .with("the deploy pipeline does not require manual approval", b_vec);

    let input_a = ClassifyInput {
        file_path: None,
        content: "the deploy pipeline requires manual approval",
        title: "Deploy approval policy",
        trigger_phrases: &[],
    };
    let first = orchestrate::save(&db.storage, &embedder, &input_a, None, 5_000, Utc::now()).unwrap();
    assert_eq!(first.decision, Decision::Create);

    let input_b = ClassifyInput {
        file_path: None,
        content: "the deploy pipeline does not require manual approval",
        title: "Deploy approval policy update",
        trigger_phrases: &[],
    };
    let second = orchestrate::save(&db.storage, &embedder, &input_b, None, 5_000, Utc::now()).unwrap();
    assert_eq!(second.decision, Decision::Create);
    assert_ne!(second.record_id, first.record_id);

    // Both records persisted distinctly; a conflict was recorded against
    // the first one rather than silently overwriting it.
    assert!(db.storage.fetch_by_id(&first.record_id).unwrap().is_some());
    assert!(db.storage.fetch_by_id(&second.record_id).unwrap().is_some());
}

#[test]
fn search_applies_the_testing_effect_and_bumps_access_count() {
    let db = TestDatabaseManager::new_temp();
    let outcome = db.save("the staging environment refreshes nightly from prod", "Staging refresh");
    let before = db.storage_fetch(&outcome.record_id);
    // access_count seeds at 1 on creation (creation counts as the first access).
    assert_eq!(before.access_count, 1);

    let weights = ScoreWeights::default();
    let results = orchestrate::search(
        &db.storage,
        &db.embedder,
        "the staging environment refreshes nightly from prod",
        10,
        &weights,
        5_000,
        Utc::now(),
    )
    .unwrap();
    assert_eq!(results.len(), 1);

    let after = db.storage_fetch(&outcome.record_id);
    assert_eq!(after.access_count, 2);
    assert!(after.review_count >= before.review_count);
}

#[test]
fn dimension_mismatch_is_rejected_before_the_gate_runs() {
    let db = TestDatabaseManager::new_temp();
    db.save("seed record to pin the store's embedding dimensionality", "Seed");

    let wrong_dims = FixtureEmbedder::new(db.embedder.dimensions() + 8);
    let input = ClassifyInput {
        file_path: None,
        content: "a record embedded at the wrong dimensionality",
        title: "Mismatch",
        trigger_phrases: &[],
    };
    let result = orchestrate::save(&db.storage, &wrong_dims, &input, None, 5_000, Utc::now());
    assert!(matches!(result, Err(CoreError::DimensionMismatch { .. })));
}

mod concurrent_save_support {
    use super::*;
    use engram_core::embeddings::HashEmbeddingProvider;
    use engram_core::storage::Storage;
    use std::path::PathBuf;

    pub fn run(db_path: PathBuf) {
        let storage = Arc::new(Storage::open(Some(db_path)).unwrap());
        let embedder = Arc::new(HashEmbeddingProvider::default());
        let content = "exactly one of these concurrent saves should create a record";

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let storage = Arc::clone(&storage);
                let embedder = Arc::clone(&embedder);
                thread::spawn(move || {
                    let input = ClassifyInput {
                        file_path: None,
                        content,
                        title: "Race",
                        trigger_phrases: &[],
                    };
                    orchestrate::save(storage.as_ref(), embedder.as_ref(), &input, None, 5_000, Utc::now())
                })
            })
            .collect();

        let outcomes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap().unwrap()).collect();

        let creates = outcomes.iter().filter(|o| o.decision == Decision::Create).count();
        assert_eq!(creates, 1, "exactly one concurrent save should create a record, the rest should reinforce or reject as duplicates");

        let embedding = embedder.embed(content, 5_000).unwrap();
        let matches = storage.nearest(&embedding, 10, false).unwrap();
        assert_eq!(matches.len(), 1, "the store must settle on a single record despite the concurrent race");
    }
}

#[test]
fn concurrent_saves_of_identical_content_settle_on_a_single_record() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let db_path = temp_dir.path().join("race.sqlite3");
    // Pre-create the schema so every thread opens against an already-migrated file.
    drop(engram_core::storage::Storage::open(Some(db_path.clone())).unwrap());
    concurrent_save_support::run(db_path);
}
