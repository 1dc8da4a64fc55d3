//! Conservative contradiction detector (§4.4): near-duplicate phrasing that
//! diverges only by negation. Precision matters more than recall here — a
//! missed contradiction just means an extra REINFORCE; a false positive
//! splits one fact into two conflicting records.
//!
//! Two texts that embed as near-duplicates (the gate only calls this on
//! candidates already in the HIGH_MATCH band) but share most of their
//! tokens while exactly one carries a negation marker are the textbook
//! contradiction shape: "the API uses bearer tokens" vs "the API does not
//! use bearer tokens" keeps almost every word and only flips the claim.
//! Two texts that share *few* tokens aren't meaningfully "contradicting"
//! each other even if one happens to contain a negation word — they're
//! just about different things.

/// Token-overlap threshold at or above which two texts are considered
/// near-duplicate phrasing, so a negation asymmetry between them signals a
/// real contradiction rather than two unrelated statements. Set below both
/// of spec.md's worked examples (bearer-token ≈0.5, deploy-approval ≈0.556
/// Jaccard overlap under this tokenizer) so both are caught.
pub const TOKEN_OVERLAP_THRESHOLD: f32 = 0.35;

const NEGATION_MARKERS: &[&str] = &[
    "not", "no", "never", "cannot", "can't", "don't", "doesn't", "isn't", "won't", "without",
];

fn tokenize(text: &str) -> std::collections::HashSet<String> {
    text.to_ascii_lowercase()
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}

/// Jaccard similarity of the two texts' lower-cased token sets.
pub fn token_overlap(a: &str, b: &str) -> f32 {
    let ta = tokenize(a);
    let tb = tokenize(b);
    if ta.is_empty() && tb.is_empty() {
        return 1.0;
    }
    let intersection = ta.intersection(&tb).count();
    let union = ta.union(&tb).count();
    if union == 0 {
        0.0
    } else {
        intersection as f32 / union as f32
    }
}

fn has_negation(text: &str) -> bool {
    let tokens = tokenize(text);
    NEGATION_MARKERS.iter().any(|m| tokens.contains(*m))
}

/// `true` when `a`/`b` share most of their tokens *and* exactly one of the
/// two contains a negation marker — the conservative heuristic from §4.4.
pub fn is_contradictory(a: &str, b: &str) -> bool {
    token_overlap(a, b) >= TOKEN_OVERLAP_THRESHOLD && has_negation(a) != has_negation(b)
}

/// A `[0, 1]` contradiction score for audit/conflict-entry purposes: `0.0`
/// right at the threshold, rising to `1.0` as the two texts converge on
/// being identical apart from the negation.
pub fn contradiction_score(a: &str, b: &str) -> f32 {
    if has_negation(a) == has_negation(b) {
        return 0.0;
    }
    let overlap = token_overlap(a, b);
    ((overlap - TOKEN_OVERLAP_THRESHOLD) / (1.0 - TOKEN_OVERLAP_THRESHOLD)).clamp(0.0, 1.0)
}
