//! Search orchestration (§4.7): embed query → fetch top-M candidates →
//! decay-adjust → score → rank → apply the testing effect to the returned
//! window → bump access counts.

use chrono::{DateTime, Utc};

use crate::embeddings::EmbeddingProvider;
use crate::error::Result;
use crate::fsrs;
use crate::gate::{HIGH_MATCH, MEDIUM_MATCH};
use crate::model::{LifecycleState, MemoryRecord, Rating};
use crate::scorer::{score_candidates, ScoreWeights};
use crate::storage::{StorageBackend, StorageTxn};
use crate::tier::lifecycle_state;

/// Candidate pool fetched from the store is this multiple of `limit`
/// (floored at `MIN_POOL_SIZE`), so the scorer has enough breadth to rank
/// over before truncating to the caller's requested window.
const POOL_MULTIPLIER: usize = 4;
const MIN_POOL_SIZE: usize = 20;

/// One ranked result, carrying enough of the record for a caller to render
/// it without a second fetch.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub record: MemoryRecord,
    pub score: f64,
    pub similarity: f32,
    pub lifecycle: LifecycleState,
}

/// Runs the search pipeline for `query`, returning up to `limit` results
/// ranked by the composite score (§4.5), after applying the testing effect
/// (§4.7) to every returned record and bumping its `access_count`.
pub fn search(
    storage: &dyn StorageBackend,
    embedder: &dyn EmbeddingProvider,
    query: &str,
    limit: usize,
    weights: &ScoreWeights,
    timeout_ms: u64,
    now: DateTime<Utc>,
) -> Result<Vec<SearchResult>> {
    weights.validate()?;
    let query_embedding = embedder.embed(query, timeout_ms)?;

    let pool_size = (limit.saturating_mul(POOL_MULTIPLIER)).max(MIN_POOL_SIZE);
    let hits = storage.nearest(&query_embedding, pool_size, true)?;
    if hits.is_empty() {
        return Ok(Vec::new());
    }

    let refs: Vec<(&MemoryRecord, f32)> = hits.iter().map(|(r, s)| (r, *s)).collect();
    let scored = score_candidates(&refs, &query_embedding, now, weights);

    let mut results = Vec::with_capacity(limit.min(scored.len()));
    storage.transaction(&mut |txn| {
        for candidate in scored.iter().take(limit) {
            let mut record = candidate.record.clone();
            apply_testing_effect(&mut record, candidate.semantic_similarity, now);
            txn.update(&record)?;
            results.push(SearchResult {
                lifecycle: lifecycle_state(&record, now),
                score: candidate.score,
                similarity: candidate.semantic_similarity,
                record,
            });
        }
        Ok(())
    })?;

    Ok(results)
}

/// `access_count` always advances on return; `stability`/`difficulty` only
/// move when the match was close enough to count as a recall (§4.7).
fn apply_testing_effect(record: &mut MemoryRecord, similarity: f32, now: DateTime<Utc>) {
    record.access_count += 1;

    let grade = if similarity >= HIGH_MATCH {
        Some(Rating::Good)
    } else if similarity >= MEDIUM_MATCH {
        Some(Rating::Hard)
    } else {
        None
    };

    if let Some(grade) = grade {
        let r_now = fsrs::retrievability(record.days_since_review(now), record.stability);
        let (stability, difficulty) =
            fsrs::update(record.stability, record.difficulty, record.memory_type, grade, r_now);
        record.stability = stability;
        record.difficulty = difficulty;
        record.review_count += 1;
        record.last_review = now;
    }
}
