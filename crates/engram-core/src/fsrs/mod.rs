//! The FSRS-4.5 scheduler: pure numeric state update for stability,
//! difficulty, and retrievability (§4.2). Every function here is a free
//! function over plain numbers — no storage, no I/O, no clock access beyond
//! what the caller supplies.

pub mod weights;

use crate::model::{MemoryType, Rating};
pub use weights::FSRS45_DEFAULT_WEIGHTS;

/// `FACTOR = 0.9^(-1/DECAY) - 1 = 19/81`, chosen so that seeding
/// `stability = half_life` makes `retrievability(half_life, half_life)`
/// equal exactly 0.9 (§4.2 initialisation, §8 half-life law).
pub const FACTOR: f64 = 19.0 / 81.0;
pub const DECAY: f64 = 0.5;

/// `R(t, S) = (1 + FACTOR * t / S)^(-DECAY)`.
///
/// `t = 0` returns exactly `1.0`. An infinite (sentinel) stability — used by
/// meta-cognitive records — also returns exactly `1.0` regardless of `t`.
/// Does not clamp; callers needing the `[1e-6, 1.0]` bound from §4.3 should
/// use [`crate::decay::retrievability_now`] instead.
pub fn retrievability(t_days: f64, stability: f64) -> f64 {
    if t_days <= 0.0 || stability.is_infinite() {
        return 1.0;
    }
    (1.0 + FACTOR * t_days / stability).powf(-DECAY)
}

/// `D0 = clamp(w4 - w5*(g-3), 1.0, 10.0)` for the initial grade `g` (default 3).
pub fn initial_difficulty(grade: i8, weights: &[f64; 17]) -> f64 {
    (weights[4] - weights[5] * (grade as f64 - 3.0)).clamp(1.0, 10.0)
}

/// Seeds `(stability, difficulty)` for a brand-new record of the given type,
/// per §4.2's initialisation rule: `stability = half_life(type)` exactly
/// reproduces `R(half_life, S0) = 0.9` for the `FACTOR`/`DECAY` constants
/// above (the two are reciprocal by construction). Meta-cognitive records
/// seed the sentinel stability instead.
pub fn initial_state(memory_type: MemoryType) -> (f64, f64) {
    let difficulty = initial_difficulty(3, &FSRS45_DEFAULT_WEIGHTS);
    match memory_type.half_life_days() {
        Some(half_life) => (half_life, difficulty),
        None => (f64::INFINITY, difficulty),
    }
}

/// Stability update on a successful recall (`grade` in `{Hard, Good, Easy}`).
///
/// `S' = S * (1 + e^w8 * (11-D) * S^-w9 * (e^(w10*(1-R)) - 1) * hard_penalty * easy_bonus)`
pub fn next_recall_stability(s: f64, d: f64, r: f64, grade: Rating, weights: &[f64; 17]) -> f64 {
    let hard_penalty = if matches!(grade, Rating::Hard) {
        weights[15]
    } else {
        1.0
    };
    let easy_bonus = if matches!(grade, Rating::Easy) {
        weights[16]
    } else {
        1.0
    };
    let growth = weights[8].exp()
        * (11.0 - d)
        * s.powf(-weights[9])
        * ((weights[10] * (1.0 - r)).exp() - 1.0)
        * hard_penalty
        * easy_bonus;
    s * (1.0 + growth)
}

/// Stability update on failure (`grade = Again`).
///
/// `S' = w11 * D^-w12 * ((S+1)^w13 - 1) * e^(w14*(1-R))`
pub fn next_forget_stability(s: f64, d: f64, r: f64, weights: &[f64; 17]) -> f64 {
    weights[11] * d.powf(-weights[12]) * ((s + 1.0).powf(weights[13]) - 1.0) * (weights[14] * (1.0 - r)).exp()
}

/// `D' = clamp(D - w6*(g-3), 1, 10)`, then mean-reverted toward `prior`:
/// `D'' = clamp(D' + w7*(prior - D'), 1, 10)`.
pub fn next_difficulty(d: f64, grade: Rating, prior: f64, weights: &[f64; 17]) -> f64 {
    let g = grade.grade() as f64;
    let raw = (d - weights[6] * (g - 3.0)).clamp(1.0, 10.0);
    (raw + weights[7] * (prior - raw)).clamp(1.0, 10.0)
}

/// Applies a review of `grade` to `(stability, difficulty)` for a record of
/// `memory_type`, given its retrievability `r` at the moment of review.
/// Meta-cognitive records are left at their sentinel stability; only
/// difficulty (cosmetic, since R is pinned regardless) moves.
///
/// Clamps the resulting stability to the `>= 0.1` invariant (§3, §7
/// `InvariantViolation`), logging a warning whenever the raw update would
/// have gone lower.
pub fn update(
    stability: f64,
    difficulty: f64,
    memory_type: MemoryType,
    grade: Rating,
    r_now: f64,
) -> (f64, f64) {
    let weights = &FSRS45_DEFAULT_WEIGHTS;
    let prior = memory_type.difficulty_prior();

    if memory_type.is_meta_cognitive() {
        let new_d = next_difficulty(difficulty, grade, prior, weights);
        return (f64::INFINITY, new_d);
    }

    let raw_s = if grade.is_failure() {
        next_forget_stability(stability, difficulty, r_now, weights)
    } else {
        next_recall_stability(stability, difficulty, r_now, grade, weights)
    };
    if raw_s < crate::model::MemoryRecord::MIN_STABILITY {
        tracing::warn!(
            raw_stability = raw_s,
            floor = crate::model::MemoryRecord::MIN_STABILITY,
            ?memory_type,
            ?grade,
            "FSRS stability update clamped to the minimum invariant"
        );
    }
    let new_s = raw_s.max(crate::model::MemoryRecord::MIN_STABILITY);
    let new_d = next_difficulty(difficulty, grade, prior, weights);
    (new_s, new_d)
}
