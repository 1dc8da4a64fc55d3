//! The tier / lifecycle state machine (§4.6): a pure function of
//! `(retrievability_now, days_since_access, access_count)`. Evaluated lazily
//! on every read — there is deliberately no background sweep here (an
//! explicit departure from the production codebase this crate is adapted
//! from, which ran a periodic consolidation daemon; see DESIGN.md).

use chrono::{DateTime, Utc};

use crate::decay::retrievability_now;
use crate::model::{LifecycleState, MemoryRecord, MemoryType};

/// Days of inaccess after which a record becomes eligible for archival.
pub const ARCHIVED_THRESHOLD_DAYS: f64 = 180.0;

/// Maps `(r, days_since_access, access_count)` to a lifecycle state.
/// Conditions are checked top to bottom; the first match wins.
pub fn classify(r: f64, days_since_access: f64, _access_count: u64) -> LifecycleState {
    if r >= 0.9 && days_since_access <= 1.0 {
        return LifecycleState::Hot;
    }
    if r >= 0.7 {
        return LifecycleState::Warm;
    }
    if r >= 0.4 {
        return LifecycleState::Cold;
    }
    if days_since_access >= ARCHIVED_THRESHOLD_DAYS && r < 0.3 {
        return LifecycleState::Archived;
    }
    LifecycleState::Dormant
}

/// Convenience wrapper computing the lifecycle state directly from a record
/// and the current time. Meta-cognitive records are pinned to HOT
/// regardless of access recency, per §4.6.
pub fn lifecycle_state(record: &MemoryRecord, now: DateTime<Utc>) -> LifecycleState {
    if record.memory_type == MemoryType::MetaCognitive {
        return LifecycleState::Hot;
    }
    let r = retrievability_now(record, now);
    let days_since_access = record.days_since_review(now);
    classify(r, days_since_access, record.access_count)
}

/// `true` when a record in this state should be excluded from default
/// search candidates (§3 Lifecycle, §6 `nearest`'s `exclude_archived`).
pub fn is_archived(state: LifecycleState) -> bool {
    matches!(state, LifecycleState::Archived)
}
