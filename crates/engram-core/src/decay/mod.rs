//! Attention decay (§4.3): the single authoritative source for "how well
//! remembered is this record right now". Every other component — the
//! composite scorer, the tier state machine, the testing-effect update —
//! MUST call [`retrievability_now`] rather than recomputing retrievability
//! itself.

use chrono::{DateTime, Utc};

use crate::model::MemoryRecord;

/// Lower clamp bound. Retrievability never reports as exactly zero so that
/// downstream log-scale or division-based consumers don't need a special case.
pub const MIN_RETRIEVABILITY: f64 = 1e-6;

/// `retrievability_now(record, now) -> R ∈ (0, 1]` (§4.3).
pub fn retrievability_now(record: &MemoryRecord, now: DateTime<Utc>) -> f64 {
    let t = record.days_since_review(now);
    let r = crate::fsrs::retrievability(t, record.stability);
    r.clamp(MIN_RETRIEVABILITY, 1.0)
}
