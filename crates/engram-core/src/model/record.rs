use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{MemoryType, RecordId};

/// The primary entity. The core only ever sees snapshot copies of records —
/// the store exclusively owns persisted state (§3 Ownership).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct MemoryRecord {
    pub id: RecordId,
    pub content: String,
    /// Unit-normalised embedding. Dimensionality is constant across a store.
    pub embedding: Vec<f32>,
    pub memory_type: MemoryType,
    pub created_at: DateTime<Utc>,
    pub last_review: DateTime<Utc>,
    /// Stability in days. `f64::INFINITY` is the sentinel used by
    /// meta-cognitive (no-decay) records, preserving the `S >= 0.1`
    /// invariant trivially rather than modelling stability as `Option<f64>`.
    pub stability: f64,
    /// Difficulty in `[1.0, 10.0]`.
    pub difficulty: f64,
    pub review_count: u64,
    pub access_count: u64,
    /// Importance in `[0.0, 1.0]`.
    pub importance: f64,
}

impl MemoryRecord {
    /// Stability sentinel for meta-cognitive records: retrievability stays
    /// at 1.0 forever regardless of elapsed time (§4.2, §4.3).
    pub const SENTINEL_STABILITY: f64 = f64::INFINITY;

    pub const MIN_STABILITY: f64 = 0.1;
    pub const MIN_DIFFICULTY: f64 = 1.0;
    pub const MAX_DIFFICULTY: f64 = 10.0;

    /// Constructs a brand-new record at `now`, seeding stability/difficulty
    /// from the scheduler's initialisation rule (§4.2). `importance`
    /// defaults to 0.5 when not supplied by the caller. `review_count` and
    /// `access_count` both seed at 1: creation is itself the first review
    /// (spec.md's duplicate-reinforcement scenario expects `review_count=2`
    /// after exactly one CREATE followed by one REINFORCE, which only holds
    /// if creation counts as the first).
    pub fn new(
        content: impl Into<String>,
        embedding: Vec<f32>,
        memory_type: MemoryType,
        importance: Option<f64>,
        now: DateTime<Utc>,
    ) -> Self {
        let (stability, difficulty) = crate::fsrs::initial_state(memory_type);
        Self {
            id: RecordId::new(),
            content: content.into(),
            embedding,
            memory_type,
            created_at: now,
            last_review: now,
            stability,
            difficulty,
            review_count: 1,
            access_count: 1,
            importance: importance.unwrap_or(0.5).clamp(0.0, 1.0),
        }
    }

    pub fn days_since_review(&self, now: DateTime<Utc>) -> f64 {
        let elapsed = now.signed_duration_since(self.last_review);
        (elapsed.num_milliseconds() as f64 / 86_400_000.0).max(0.0)
    }

    /// Asserts the invariants in §3/§8 hold. Used by tests and, at `debug`
    /// severity, by the storage layer after every write.
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.stability < Self::MIN_STABILITY {
            return Err(format!("stability {} below minimum", self.stability));
        }
        if !(Self::MIN_DIFFICULTY..=Self::MAX_DIFFICULTY).contains(&self.difficulty) {
            return Err(format!("difficulty {} out of range", self.difficulty));
        }
        if self.review_count > self.access_count {
            return Err(format!(
                "review_count {} exceeds access_count {}",
                self.review_count, self.access_count
            ));
        }
        if self.last_review < self.created_at {
            return Err("last_review precedes created_at".into());
        }
        Ok(())
    }
}

/// Lifecycle state, derived lazily on read (§4.6). Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleState {
    Hot,
    Warm,
    Cold,
    Dormant,
    Archived,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LifecycleState::Hot => "HOT",
            LifecycleState::Warm => "WARM",
            LifecycleState::Cold => "COLD",
            LifecycleState::Dormant => "DORMANT",
            LifecycleState::Archived => "ARCHIVED",
        };
        write!(f, "{s}")
    }
}

/// The PE gate's four possible outcomes. A tagged variant rather than ad-hoc
/// fields on a result object, per the redesign note in §9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Create,
    Reinforce,
    Merge,
    #[serde(rename = "REJECT")]
    RejectAsDuplicate,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Decision::Create => "CREATE",
            Decision::Reinforce => "REINFORCE",
            Decision::Merge => "MERGE",
            Decision::RejectAsDuplicate => "REJECT-as-duplicate",
        };
        write!(f, "{s}")
    }
}

/// Append-only audit row for a PE gate decision (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: RecordId,
    pub new_content_hash: String,
    pub matched_id: Option<RecordId>,
    pub decision: Decision,
    pub similarity: f32,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
    /// Set when the gate fell through to CREATE because the similarity
    /// index was unavailable (§4.4 failure modes).
    pub degraded: bool,
}

/// A detected contradiction between two high-similarity records (§3, §4.4).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictEntry {
    pub id: RecordId,
    pub memory_a_id: RecordId,
    pub memory_b_id: RecordId,
    pub similarity: f32,
    pub contradiction_score: f32,
    pub detected_at: DateTime<Utc>,
    pub resolved: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_satisfies_invariants() {
        let r = MemoryRecord::new(
            "hello",
            vec![0.1, 0.2, 0.3],
            MemoryType::Declarative,
            None,
            Utc::now(),
        );
        r.check_invariants().unwrap();
        assert_eq!(r.review_count, 1);
        assert_eq!(r.access_count, 1);
        assert_eq!(r.importance, 0.5);
    }

    #[test]
    fn meta_cognitive_seeds_sentinel_stability() {
        let r = MemoryRecord::new(
            "pinned",
            vec![0.0; 4],
            MemoryType::MetaCognitive,
            None,
            Utc::now(),
        );
        assert!(r.stability.is_infinite());
    }
}
