//! Vector and set similarity used by the occupational scorer.
//!
//! The dot product and both squared magnitudes are accumulated in a single
//! pass over fixed-width lanes so the optimizer emits packed SIMD adds and
//! multiplies; the scalar tail handles lengths that are not a lane multiple.

use std::collections::HashSet;
use std::hash::Hash;

const LANES: usize = 4;

/// Dot product and squared magnitudes of two equal-length slices
#[inline]
pub fn dot_and_norms(a: &[f64], b: &[f64]) -> (f64, f64, f64) {
    let len = a.len().min(b.len());
    let (a, b) = (&a[..len], &b[..len]);

    let mut dot = [0.0f64; LANES];
    let mut sq_a = [0.0f64; LANES];
    let mut sq_b = [0.0f64; LANES];

    let chunks_a = a.chunks_exact(LANES);
    let chunks_b = b.chunks_exact(LANES);
    let tail_a = chunks_a.remainder();
    let tail_b = chunks_b.remainder();

    for (ca, cb) in chunks_a.zip(chunks_b) {
        for lane in 0..LANES {
            dot[lane] += ca[lane] * cb[lane];
            sq_a[lane] += ca[lane] * ca[lane];
            sq_b[lane] += cb[lane] * cb[lane];
        }
    }

    let mut dot_sum: f64 = dot.iter().sum();
    let mut sq_a_sum: f64 = sq_a.iter().sum();
    let mut sq_b_sum: f64 = sq_b.iter().sum();

    for (x, y) in tail_a.iter().zip(tail_b) {
        dot_sum += x * y;
        sq_a_sum += x * x;
        sq_b_sum += y * y;
    }

    (dot_sum, sq_a_sum, sq_b_sum)
}

/// Cosine similarity of two vectors
///
/// Returns 0.0 for mismatched lengths, empty input or a zero vector.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let (dot, sq_a, sq_b) = dot_and_norms(a, b);
    let magnitude = sq_a.sqrt() * sq_b.sqrt();

    if magnitude == 0.0 || !magnitude.is_finite() {
        return 0.0;
    }

    (dot / magnitude).clamp(-1.0, 1.0)
}

/// Jaccard similarity `|A ∩ B| / |A ∪ B|`, 0.0 when both sets are empty
pub fn jaccard_similarity<T: Eq + Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}
