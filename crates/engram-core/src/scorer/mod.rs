//! The composite scorer (§4.5): combines six normalised signals into a
//! single ranking score. Pure with respect to its inputs — the orchestrator
//! supplies the candidate set and their query similarities; this module
//! never touches the store.

use chrono::{DateTime, Utc};

use crate::decay::retrievability_now;
use crate::error::{CoreError, Result};
use crate::gate::MEDIUM_MATCH;
use crate::model::MemoryRecord;
use crate::similarity::cosine_similarity;

/// Recency half-life, in days, for the exponential recency signal.
pub const RECENCY_HALF_LIFE_DAYS: f64 = 30.0;

/// The six fixed signal weights. Must sum to exactly 1.0 (§4.5, §8).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub semantic_similarity: f64,
    pub retrievability: f64,
    pub recency: f64,
    pub importance: f64,
    pub review_count: f64,
    pub co_activation: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            semantic_similarity: 0.40,
            retrievability: 0.15,
            recency: 0.15,
            importance: 0.15,
            review_count: 0.10,
            co_activation: 0.05,
        }
    }
}

impl ScoreWeights {
    /// Errors with `ConfigInvalid` when the weights don't sum to 1.0 within
    /// floating-point tolerance (§7, §8).
    pub fn validate(&self) -> Result<()> {
        let sum = self.semantic_similarity
            + self.retrievability
            + self.recency
            + self.importance
            + self.review_count
            + self.co_activation;
        if (sum - 1.0).abs() > 1e-9 {
            return Err(CoreError::ConfigInvalid(format!(
                "scorer weights sum to {sum}, expected 1.0"
            )));
        }
        Ok(())
    }
}

/// One candidate as seen by the scorer: a record plus its cosine similarity
/// to the query embedding.
pub struct ScoredCandidate<'a> {
    pub record: &'a MemoryRecord,
    pub semantic_similarity: f32,
    pub score: f64,
}

fn recency_signal(record: &MemoryRecord, now: DateTime<Utc>) -> f64 {
    let days = record.days_since_review(now);
    (-std::f64::consts::LN_2 * days / RECENCY_HALF_LIFE_DAYS).exp()
}

fn review_count_signal(n: u64, n_max: u64) -> f64 {
    if n_max == 0 || n == 0 {
        return 0.0;
    }
    ((1.0 + n as f64).ln()) / ((1.0 + n_max as f64).ln())
}

/// Ranks `candidates` (each paired with its query-similarity) against
/// `query_embedding`, returning scored results sorted highest-first, ties
/// broken by more recent `last_review` (§4.5).
pub fn score_candidates<'a>(
    candidates: &[(&'a MemoryRecord, f32)],
    query_embedding: &[f32],
    now: DateTime<Utc>,
    weights: &ScoreWeights,
) -> Vec<ScoredCandidate<'a>> {
    let _ = query_embedding; // similarity already computed per-candidate by the caller
    let n_max = candidates.iter().map(|(r, _)| r.review_count).max().unwrap_or(0);
    let k = candidates.len().max(1);

    let mut scored: Vec<ScoredCandidate> = candidates
        .iter()
        .map(|&(record, sim)| {
            let semantic = sim.clamp(0.0, 1.0) as f64;
            let retrievability = retrievability_now(record, now);
            let recency = recency_signal(record, now);
            let importance = record.importance.clamp(0.0, 1.0);
            let review = review_count_signal(record.review_count, n_max);

            let sibling_hits = candidates
                .iter()
                .filter(|&&(other, _)| other.id != record.id)
                .filter(|&&(other, _)| {
                    cosine_similarity(&record.embedding, &other.embedding) >= MEDIUM_MATCH
                })
                .count();
            let co_activation = if k > 1 {
                (sibling_hits as f64 / (k - 1) as f64).min(1.0)
            } else {
                0.0
            };

            let score = weights.semantic_similarity * semantic
                + weights.retrievability * retrievability
                + weights.recency * recency
                + weights.importance * importance
                + weights.review_count * review
                + weights.co_activation * co_activation;

            ScoredCandidate {
                record,
                semantic_similarity: sim,
                score,
            }
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.record.last_review.cmp(&a.record.last_review))
    });
    scored
}
