//! End-to-end coverage of the decay/tier/lifecycle pipeline against a real
//! SQLite-backed store: records move between HOT/WARM/COLD/DORMANT/ARCHIVED
//! purely as a function of elapsed time, and meta-cognitive records never
//! decay regardless of how stale they look.

use engram_e2e_tests::harness::TestDatabaseManager;
use engram_e2e_tests::mocks::TestDataFactory;

use engram_core::model::{LifecycleState, MemoryType};
use engram_core::tier::lifecycle_state;
use chrono::Utc;

#[test]
fn a_fresh_save_is_hot() {
    let db = TestDatabaseManager::new_temp();
    let outcome = db.save("the build pipeline deploys every night at 2am", "Deploy schedule");
    let record = db.storage_fetch(&outcome.record_id);
    assert_eq!(lifecycle_state(&record, Utc::now()), LifecycleState::Hot);
}

#[test]
fn a_record_untouched_for_ninety_days_decays_to_warm_or_colder() {
    let db = TestDatabaseManager::new_temp();
    let outcome = db.save("quarterly planning happens in the first week of the quarter", "Planning cadence");
    TestDataFactory::backdate(&db.storage, &outcome.record_id, 90).unwrap();

    let record = db.storage_fetch(&outcome.record_id);
    let state = lifecycle_state(&record, Utc::now());
    assert!(
        matches!(state, LifecycleState::Warm | LifecycleState::Cold),
        "expected decay after 90 days of inaccess, got {state:?}"
    );
}

#[test]
fn a_record_untouched_for_over_a_year_becomes_archived() {
    let db = TestDatabaseManager::new_temp();
    let outcome = db.save("a one-off note nobody will need again", "Stale note");
    TestDataFactory::backdate(&db.storage, &outcome.record_id, 400).unwrap();

    let record = db.storage_fetch(&outcome.record_id);
    assert_eq!(lifecycle_state(&record, Utc::now()), LifecycleState::Archived);
}

#[test]
fn archived_records_are_excluded_from_default_search_candidates() {
    let db = TestDatabaseManager::new_temp();
    let outcome = db.save("an ancient fact that has since been archived", "Ancient fact");
    TestDataFactory::backdate(&db.storage, &outcome.record_id, 400).unwrap();

    let embedding = db.embedder_embed("an ancient fact that has since been archived");
    let candidates = db.storage_nearest(&embedding, 10, true);
    assert!(candidates.iter().all(|(r, _)| r.id != outcome.record_id));

    let candidates_including_archived = db.storage_nearest(&embedding, 10, false);
    assert!(candidates_including_archived.iter().any(|(r, _)| r.id == outcome.record_id));
}

#[test]
fn meta_cognitive_records_are_pinned_hot_even_when_ancient() {
    use engram_core::classifier::ClassifyInput;
    use engram_core::orchestrate;

    let db = TestDatabaseManager::new_temp();
    let input = ClassifyInput {
        file_path: None,
        content: "---\nimportance_tier: constitutional\n---\nI tend to overestimate how much I've retained after a single pass",
        title: "Self-reflection on study habits",
        trigger_phrases: &[],
    };
    let outcome = orchestrate::save(&db.storage, &db.embedder, &input, None, 5_000, Utc::now()).unwrap();
    assert_eq!(db.memory_type_of(&outcome.record_id.0.to_string()), MemoryType::MetaCognitive);

    TestDataFactory::backdate(&db.storage, &outcome.record_id, 3650).unwrap();
    let record = db.storage_fetch(&outcome.record_id);
    assert_eq!(lifecycle_state(&record, Utc::now()), LifecycleState::Hot);
}
