//! Cosine similarity over embedding vectors, shared by the PE gate and the
//! composite scorer so both consult exactly one implementation.

/// Cosine similarity of two equal-length vectors, in `[-1.0, 1.0]`.
/// Returns `0.0` for a zero-length or mismatched-length pair rather than
/// panicking — dimension mismatches are caught earlier, at the storage
/// boundary (`CoreError::DimensionMismatch`), not here.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}
