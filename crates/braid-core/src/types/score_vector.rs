//! Score vectors aligned to a fixed candidate ordering.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::error::{BraidError, BraidResult};

/// Raw scores for a candidate set, index-aligned to the candidates they were produced for.
///
/// Position `i` always refers to candidate `i` of the set that was scored.
/// Scores are guaranteed finite; comparisons are only meaningful within one vector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f32>", into = "Vec<f32>")]
pub struct ScoreVector(Vec<f32>);

impl ScoreVector {
    /// Create a score vector, rejecting NaN and infinite values.
    pub fn new(scores: Vec<f32>) -> BraidResult<Self> {
        if let Some((index, value)) = scores.iter().enumerate().find(|(_, s)| !s.is_finite()) {
            return Err(BraidError::non_finite_score(index, *value));
        }
        Ok(Self(scores))
    }

    /// Wrap scores the caller has already kept finite.
    pub(crate) fn from_finite(scores: Vec<f32>) -> Self {
        debug_assert!(scores.iter().all(|s| s.is_finite()));
        Self(scores)
    }

    /// Number of scored candidates.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no candidate was scored.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Score of the candidate at `index`.
    pub fn get(&self, index: usize) -> Option<f32> {
        self.0.get(index).copied()
    }

    /// Largest score, `None` when empty.
    pub fn max(&self) -> Option<f32> {
        self.0.iter().copied().map(OrderedFloat).max().map(|m| m.0)
    }

    /// Borrow the raw scores.
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Iterate over the scores in candidate order.
    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        self.0.iter().copied()
    }

    /// Consume into the raw scores.
    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }

    /// Fail unless `other` scores the same number of candidates.
    pub fn ensure_aligned(&self, other: &ScoreVector) -> BraidResult<()> {
        if self.len() != other.len() {
            return Err(BraidError::length_mismatch(
                "score vectors",
                self.len(),
                other.len(),
            ));
        }
        Ok(())
    }

    /// Candidate indices ordered by descending score.
    ///
    /// Equal scores keep their original candidate order.
    pub fn ranking(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.0.len()).collect();
        // sort_by is stable, so ties keep index order
        order.sort_by(|&a, &b| OrderedFloat(self.0[b]).cmp(&OrderedFloat(self.0[a])));
        order
    }
}

impl TryFrom<Vec<f32>> for ScoreVector {
    type Error = BraidError;

    fn try_from(scores: Vec<f32>) -> BraidResult<Self> {
        Self::new(scores)
    }
}

impl From<ScoreVector> for Vec<f32> {
    fn from(scores: ScoreVector) -> Self {
        scores.0
    }
}
