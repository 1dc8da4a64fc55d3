//! The prediction-error (PE) admission gate (§4.4): decides whether a
//! candidate memory should be created, reinforced, merged, or rejected as a
//! duplicate of an existing record. Pure with respect to its inputs — it
//! takes a candidate list handed to it by the caller rather than querying a
//! store itself, per the "callable without a store" redesign note (§9).

mod contradiction;

pub use contradiction::{contradiction_score, is_contradictory, token_overlap};

use chrono::{DateTime, Utc};

use crate::model::{ConflictEntry, Decision, RecordId};
use crate::similarity::cosine_similarity;

/// `s1 >= DUPLICATE` rejects the candidate as a duplicate (closed lower bound).
pub const DUPLICATE: f32 = 0.95;
/// `HIGH_MATCH <= s1 < DUPLICATE` reinforces or, on contradiction, creates.
pub const HIGH_MATCH: f32 = 0.90;
/// `MEDIUM_MATCH <= s1 < HIGH_MATCH` is MERGE candidacy.
pub const MEDIUM_MATCH: f32 = 0.70;
/// Top-K nearest neighbours considered (§4.4 step 1).
pub const CANDIDATE_K: usize = 5;

/// A single existing record as seen by the gate: just enough to score
/// similarity and run the contradiction detector, nothing storage-specific.
#[derive(Debug, Clone)]
pub struct CandidateMemory {
    pub id: RecordId,
    pub content: String,
    pub embedding: Vec<f32>,
    pub last_review: DateTime<Utc>,
}

/// One of the top-K nearest neighbours, with its similarity to the query.
#[derive(Debug, Clone)]
pub struct SimilarityResult {
    pub id: RecordId,
    pub similarity: f32,
}

/// The gate's tagged-variant outcome (§9 redesign note), replacing ad-hoc
/// fields on a generic result object.
#[derive(Debug, Clone)]
pub struct GateDecision {
    pub decision: Decision,
    pub matched_id: Option<RecordId>,
    pub similarity: f32,
    pub reason: String,
    /// Set when the gate fell through to CREATE because no similarity index
    /// was available (§4.4 failure modes) rather than because of scoring.
    pub degraded: bool,
    /// Populated only when `decision == Decision::Create` *and* the
    /// candidate's top match was contradictory (HIGH_MATCH branch).
    pub conflict: Option<ConflictEntry>,
}

/// Evaluates the gate for `content`/`embedding` against `candidates`
/// (assumed already restricted to active, non-archived records by the
/// caller's storage query). `index_available = false` models the similarity
/// index being down; per §4.4 the gate then MUST fall through to CREATE
/// with `degraded = true`, never silently reject.
pub fn evaluate(
    content: &str,
    embedding: &[f32],
    candidates: &[CandidateMemory],
    index_available: bool,
    now: DateTime<Utc>,
) -> GateDecision {
    if !index_available {
        return GateDecision {
            decision: Decision::Create,
            matched_id: None,
            similarity: 0.0,
            reason: "similarity index unavailable, falling through to CREATE".to_string(),
            degraded: true,
            conflict: None,
        };
    }

    if candidates.is_empty() {
        return GateDecision {
            decision: Decision::Create,
            matched_id: None,
            similarity: 0.0,
            reason: "no existing candidates".to_string(),
            degraded: false,
            conflict: None,
        };
    }

    let mut scored: Vec<(f32, &CandidateMemory)> = candidates
        .iter()
        .map(|c| (cosine_similarity(embedding, &c.embedding), c))
        .collect();
    // Top similarity first; ties broken by most recent last_review (§4.4 step 3).
    scored.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.1.last_review.cmp(&a.1.last_review))
    });
    scored.truncate(CANDIDATE_K);

    let (s1, matched) = scored[0];

    if s1 >= DUPLICATE {
        return GateDecision {
            decision: Decision::RejectAsDuplicate,
            matched_id: Some(matched.id.clone()),
            similarity: s1,
            reason: format!("similarity {s1:.4} >= DUPLICATE threshold {DUPLICATE}"),
            degraded: false,
            conflict: None,
        };
    }

    if s1 >= HIGH_MATCH {
        if is_contradictory(content, &matched.content) {
            let conflict = ConflictEntry {
                id: RecordId::new(),
                memory_a_id: matched.id.clone(),
                memory_b_id: RecordId::new(), // caller overwrites with the new record's real id
                similarity: s1,
                contradiction_score: contradiction_score(content, &matched.content),
                detected_at: now,
                resolved: false,
            };
            return GateDecision {
                decision: Decision::Create,
                matched_id: Some(matched.id.clone()),
                similarity: s1,
                reason: format!(
                    "similarity {s1:.4} in [HIGH_MATCH, DUPLICATE) but contradictory; creating and flagging conflict"
                ),
                degraded: false,
                conflict: Some(conflict),
            };
        }
        return GateDecision {
            decision: Decision::Reinforce,
            matched_id: Some(matched.id.clone()),
            similarity: s1,
            reason: format!("similarity {s1:.4} in [HIGH_MATCH, DUPLICATE)"),
            degraded: false,
            conflict: None,
        };
    }

    if s1 >= MEDIUM_MATCH {
        return GateDecision {
            decision: Decision::Merge,
            matched_id: Some(matched.id.clone()),
            similarity: s1,
            reason: format!("similarity {s1:.4} in [MEDIUM_MATCH, HIGH_MATCH): merge candidacy"),
            degraded: false,
            conflict: None,
        };
    }

    GateDecision {
        decision: Decision::Create,
        matched_id: None,
        similarity: s1,
        reason: format!("similarity {s1:.4} < MEDIUM_MATCH threshold {MEDIUM_MATCH}"),
        degraded: false,
        conflict: None,
    }
}
