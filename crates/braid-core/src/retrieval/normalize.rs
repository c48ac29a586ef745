//! Max-scaling of raw score vectors.
//!
//! Every element is divided by the vector's maximum so the best candidate
//! lands on 1.0 and relative spacing is preserved. A vector whose maximum is
//! not positive (empty, all zeros, all negative) is returned unchanged;
//! downstream fusion must tolerate such unnormalized vectors.

use crate::types::ScoreVector;

/// Scale `scores` by their maximum.
///
/// Never divides by zero and never produces NaN or infinity.
pub fn normalize(scores: &ScoreVector) -> ScoreVector {
    match scores.max() {
        Some(max) if max > 0.0 => ScoreVector::from_finite(
            scores
                .iter()
                // a huge negative score over a tiny max could overflow
                .map(|s| (s / max).max(f32::MIN))
                .collect(),
        ),
        _ => scores.clone(),
    }
}
