//! Score fusion strategies for hybrid retrieval.
//!
//! Combines a lexical and a semantic score vector over the same candidate
//! ordering into one fused vector, or several ranked id lists into one
//! ranking. The score-based strategies (linear, harmonic, max) normalize both
//! inputs first; Reciprocal Rank Fusion only ever looks at rank positions and
//! is the safe choice when the two signals live on incomparable scales.

use std::collections::HashMap;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::debug;

use crate::error::{BraidError, BraidResult};
use crate::types::{RankedList, ScoreVector};

use super::normalize::normalize;

/// Standard RRF constant from Cormack, Clarke & Buettcher (2009).
pub const DEFAULT_RRF_K: u32 = 60;

/// Guards the harmonic mean when both normalized scores are zero.
pub const HARMONIC_EPSILON: f32 = 1e-9;

/// How two signals are combined.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FusionStrategy {
    /// Weighted sum of normalized scores.
    #[default]
    Linear,
    /// Harmonic mean of normalized scores; rewards agreement between signals.
    Harmonic,
    /// Element-wise maximum of normalized scores.
    Max,
    /// Reciprocal Rank Fusion over rank positions.
    Rrf,
}

/// Fusion settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    pub strategy: FusionStrategy,
    /// `(lexical, semantic)` weights, linear strategy only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weights: Option<(f32, f32)>,
    /// RRF constant, rrf strategy only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rrf_k: Option<u32>,
}

impl FusionConfig {
    /// Linear fusion with the default weights.
    pub fn linear() -> Self {
        Self::default()
    }

    /// Linear fusion with custom weights.
    pub fn linear_weighted(lexical_weight: f32, semantic_weight: f32) -> Self {
        Self {
            strategy: FusionStrategy::Linear,
            weights: Some((lexical_weight, semantic_weight)),
            rrf_k: None,
        }
    }

    /// Harmonic-mean fusion.
    pub fn harmonic() -> Self {
        Self {
            strategy: FusionStrategy::Harmonic,
            ..Default::default()
        }
    }

    /// Max-blend fusion.
    pub fn max_blend() -> Self {
        Self {
            strategy: FusionStrategy::Max,
            ..Default::default()
        }
    }

    /// Reciprocal Rank Fusion with the given k.
    pub fn rrf(k: u32) -> Self {
        Self {
            strategy: FusionStrategy::Rrf,
            weights: None,
            rrf_k: Some(k),
        }
    }

    /// Effective linear weights.
    pub fn linear_fusion(&self) -> LinearFusion {
        self.weights
            .map(|(lexical, semantic)| LinearFusion::new(lexical, semantic))
            .unwrap_or_default()
    }

    /// Effective RRF parameters.
    pub fn rrf_fusion(&self) -> RrfFusion {
        RrfFusion::new(self.rrf_k.unwrap_or(DEFAULT_RRF_K))
    }

    /// Validate weights and k.
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(k) = self.rrf_k {
            if k == 0 {
                return Err("rrf_k must be a positive integer");
            }
        }
        if self.weights.is_some() {
            self.linear_fusion().validate()?;
        }
        Ok(())
    }
}

/// Linear weighted fusion of normalized lexical and semantic scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFusion {
    /// Weight for the normalized lexical score.
    pub lexical_weight: f32,
    /// Weight for the normalized semantic score.
    pub semantic_weight: f32,
}

impl Default for LinearFusion {
    fn default() -> Self {
        Self {
            lexical_weight: 0.4,
            semantic_weight: 0.6,
        }
    }
}

impl LinearFusion {
    /// Create linear fusion with custom weights.
    ///
    /// Weights need not sum to 1.
    pub fn new(lexical_weight: f32, semantic_weight: f32) -> Self {
        Self {
            lexical_weight,
            semantic_weight,
        }
    }

    /// `w1 * normalize(lexical) + w2 * normalize(semantic)`, element-wise.
    pub fn fuse(&self, lexical: &ScoreVector, semantic: &ScoreVector) -> BraidResult<ScoreVector> {
        combine(lexical, semantic, |a, b| {
            self.lexical_weight * a + self.semantic_weight * b
        })
    }

    /// Weights must be finite and non-negative.
    pub fn validate(&self) -> Result<(), &'static str> {
        if !self.lexical_weight.is_finite() || !self.semantic_weight.is_finite() {
            return Err("Fusion weights must be finite");
        }
        if self.lexical_weight < 0.0 || self.semantic_weight < 0.0 {
            return Err("Fusion weights must be non-negative");
        }
        Ok(())
    }
}

/// `2ab / (a + b + ε)` over normalized inputs, element-wise.
///
/// Results stay in `[0, 1]` only for non-negative raw scores. A negative
/// score in one signal and a positive in the other can push the mean above
/// 1, so scorers feeding this strategy should not emit negatives.
pub fn harmonic(lexical: &ScoreVector, semantic: &ScoreVector) -> BraidResult<ScoreVector> {
    combine(lexical, semantic, |a, b| {
        2.0 * (a * b) / (a + b + HARMONIC_EPSILON)
    })
}

/// Element-wise maximum of normalized inputs.
pub fn max_blend(lexical: &ScoreVector, semantic: &ScoreVector) -> BraidResult<ScoreVector> {
    combine(lexical, semantic, f32::max)
}

fn combine(
    lexical: &ScoreVector,
    semantic: &ScoreVector,
    op: impl Fn(f32, f32) -> f32,
) -> BraidResult<ScoreVector> {
    lexical.ensure_aligned(semantic)?;
    let lexical = normalize(lexical);
    let semantic = normalize(semantic);
    ScoreVector::new(
        lexical
            .iter()
            .zip(semantic.iter())
            .map(|(a, b)| op(a, b))
            .collect(),
    )
}

/// Reciprocal Rank Fusion for combining ranked lists.
///
/// Formula: score(d) = sum(1 / (k + rank_i(d))) for each list i containing d.
/// Lists that do not contain an id contribute nothing for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RrfFusion {
    /// Higher k flattens the advantage of top ranks.
    pub k: u32,
}

impl Default for RrfFusion {
    fn default() -> Self {
        Self { k: DEFAULT_RRF_K }
    }
}

impl RrfFusion {
    /// Create RRF fusion with custom k value.
    pub fn new(k: u32) -> Self {
        Self { k }
    }

    fn contribution(&self, rank: usize) -> f32 {
        1.0 / (self.k as f32 + rank as f32)
    }

    /// Fuse ranked lists, returning `(id, rrf_score)` sorted by score descending.
    ///
    /// Equal scores keep the order in which ids were first seen, scanning the
    /// lists in the order given.
    pub fn fuse_scored(&self, ranked_lists: &[RankedList]) -> Vec<(String, f32)> {
        let mut slots: HashMap<&str, usize> = HashMap::new();
        let mut fused: Vec<(String, f32)> = Vec::new();

        for list in ranked_lists {
            for (idx, id) in list.iter().enumerate() {
                let contribution = self.contribution(idx + 1);
                match slots.get(id) {
                    Some(&slot) => fused[slot].1 += contribution,
                    None => {
                        slots.insert(id, fused.len());
                        fused.push((id.to_string(), contribution));
                    }
                }
            }
        }

        // stable: first-seen order survives ties
        fused.sort_by(|a, b| OrderedFloat(b.1).cmp(&OrderedFloat(a.1)));
        fused
    }

    /// Fuse ranked lists into one ranking.
    pub fn fuse(&self, ranked_lists: &[RankedList]) -> RankedList {
        RankedList::from_unique(
            self.fuse_scored(ranked_lists)
                .into_iter()
                .map(|(id, _)| id)
                .collect(),
        )
    }

    /// Fuse aligned score vectors by the ranks they induce.
    ///
    /// Each vector is ranked on its own (descending, ties by candidate
    /// order); the result holds each candidate's accumulated RRF score.
    pub fn fuse_vectors(&self, vectors: &[&ScoreVector]) -> BraidResult<ScoreVector> {
        let Some(first) = vectors.first() else {
            return Ok(ScoreVector::default());
        };
        let mut fused = vec![0.0f32; first.len()];

        for vector in vectors {
            first.ensure_aligned(vector)?;
            for (idx, candidate) in vector.ranking().into_iter().enumerate() {
                fused[candidate] += self.contribution(idx + 1);
            }
        }

        ScoreVector::new(fused)
    }
}

/// Fuse two aligned score vectors with the configured strategy.
pub fn fuse(
    lexical: &ScoreVector,
    semantic: &ScoreVector,
    config: &FusionConfig,
) -> BraidResult<ScoreVector> {
    config.validate().map_err(BraidError::configuration)?;
    debug!(
        strategy = %config.strategy,
        candidates = lexical.len(),
        "fusing score vectors"
    );

    match config.strategy {
        FusionStrategy::Linear => config.linear_fusion().fuse(lexical, semantic),
        FusionStrategy::Harmonic => harmonic(lexical, semantic),
        FusionStrategy::Max => max_blend(lexical, semantic),
        FusionStrategy::Rrf => config.rrf_fusion().fuse_vectors(&[lexical, semantic]),
    }
}

/// Fuse ranked id lists with Reciprocal Rank Fusion.
pub fn fuse_ranks(ranked_lists: &[RankedList], k: u32) -> RankedList {
    RrfFusion::new(k).fuse(ranked_lists)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sv(scores: &[f32]) -> ScoreVector {
        ScoreVector::new(scores.to_vec()).unwrap()
    }

    fn list(ids: &[&str]) -> RankedList {
        RankedList::new(ids.iter().copied()).unwrap()
    }

    #[test]
    fn test_linear_fusion() {
        let fused = LinearFusion::default()
            .fuse(&sv(&[2.0, 1.0, 0.0]), &sv(&[0.5, 1.0, 0.25]))
            .unwrap();

        // [1.0, 0.5, 0.0] * 0.4 + [0.5, 1.0, 0.25] * 0.6
        let expected = [0.7, 0.8, 0.15];
        for (got, want) in fused.iter().zip(expected) {
            assert!((got - want).abs() < 1e-6);
        }
    }

    #[test]
    fn test_linear_bounds() {
        let fusion = LinearFusion::new(0.7, 0.9);
        let fused = fusion
            .fuse(&sv(&[3.0, 0.0, 1.5, 2.2]), &sv(&[0.1, 0.4, 0.0, 0.9]))
            .unwrap();
        for score in fused.iter() {
            assert!((0.0..=1.6 + 1e-6).contains(&score));
        }
    }

    #[test]
    fn test_harmonic_both_zero_is_zero() {
        let fused = harmonic(&sv(&[0.0, 1.0]), &sv(&[0.0, 1.0])).unwrap();
        assert_eq!(fused.get(0), Some(0.0));
        assert!((fused.get(1).unwrap() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_harmonic_penalizes_disagreement() {
        let fused = harmonic(&sv(&[1.0, 0.5]), &sv(&[0.0, 1.0])).unwrap();
        // one signal at zero kills the harmonic mean
        assert!(fused.get(0).unwrap() < 1e-6);
        assert!(fused.get(1).unwrap() > 0.6);
    }

    #[test]
    fn test_harmonic_non_negative_inputs_stay_in_unit_range() {
        let fused = harmonic(&sv(&[3.0, 0.0, 1.0, 2.0]), &sv(&[0.5, 1.0, 0.25, 0.0])).unwrap();
        for score in fused.iter() {
            assert!((0.0..=1.0).contains(&score));
        }
        // normalized pair (1.0, 0.5)
        assert!((fused.get(0).unwrap() - 2.0 / 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_max_blend() {
        let fused = max_blend(&sv(&[4.0, 2.0, 0.0]), &sv(&[0.1, 0.2, 0.4])).unwrap();
        assert_eq!(fused.as_slice(), &[1.0, 0.5, 1.0]);
    }

    #[test]
    fn test_length_mismatch_fails_fast() {
        for config in [
            FusionConfig::linear(),
            FusionConfig::harmonic(),
            FusionConfig::max_blend(),
            FusionConfig::rrf(60),
        ] {
            let err = fuse(&sv(&[1.0, 2.0]), &sv(&[1.0]), &config).unwrap_err();
            assert!(err.is_contract_violation(), "{config:?}");
        }
    }

    #[test]
    fn test_rrf_single_list_preserves_order() {
        let input = list(&["a", "b", "c", "d"]);
        let fused = RrfFusion::default().fuse(std::slice::from_ref(&input));
        assert_eq!(fused, input);
    }

    #[test]
    fn test_rrf_duplicated_list_preserves_order() {
        let input = list(&["c", "a", "d", "b"]);
        let fused = fuse_ranks(&[input.clone(), input.clone()], 60);
        assert_eq!(fused, input);
    }

    #[test]
    fn test_rrf_rewards_agreement() {
        let fused = fuse_ranks(&[list(&["a", "b", "c"]), list(&["b", "a", "d"])], 60);
        let b_rank = fused.rank_of("b").unwrap();
        assert!(b_rank < fused.rank_of("c").unwrap());
        assert!(b_rank < fused.rank_of("d").unwrap());
        assert_eq!(fused.len(), 4);
    }

    #[test]
    fn test_rrf_ties_follow_first_seen_order() {
        let scored = RrfFusion::default().fuse_scored(&[list(&["x"]), list(&["y"])]);
        assert_eq!(scored[0].0, "x");
        assert_eq!(scored[1].0, "y");
        assert!((scored[0].1 - scored[1].1).abs() < 1e-9);

        // symmetric swap: equal totals, first list decides
        let fused = fuse_ranks(&[list(&["q", "p"]), list(&["p", "q"])], 60);
        assert_eq!(fused.as_slice(), &["q".to_string(), "p".to_string()]);
    }

    #[test]
    fn test_rrf_scores() {
        let scored = RrfFusion::new(60).fuse_scored(&[list(&["a"]), list(&["b", "a"])]);
        let a = scored.iter().find(|(id, _)| id == "a").unwrap().1;
        assert!((a - (1.0 / 61.0 + 1.0 / 62.0)).abs() < 1e-6);
    }

    #[test]
    fn test_rrf_respects_k() {
        let k10 = RrfFusion::new(10).fuse_scored(&[list(&["a"])]);
        let k60 = RrfFusion::new(60).fuse_scored(&[list(&["a"])]);
        assert!(k10[0].1 > k60[0].1);
    }

    #[test]
    fn test_rrf_empty_lists() {
        assert!(fuse_ranks(&[], 60).is_empty());
        assert!(fuse_ranks(&[RankedList::default()], 60).is_empty());
    }

    #[test]
    fn test_rrf_over_score_vectors() {
        let fused = fuse(
            &sv(&[10.0, 3.0, 7.0]),
            &sv(&[0.2, 0.9, 0.95]),
            &FusionConfig::rrf(60),
        )
        .unwrap();

        // candidate 2 ranks 2nd lexically and 1st semantically
        let best = fused.ranking()[0];
        assert_eq!(best, 2);
    }

    #[test]
    fn test_config_validation() {
        assert!(FusionConfig::rrf(0).validate().is_err());
        assert!(FusionConfig::linear_weighted(-0.1, 1.0).validate().is_err());
        assert!(FusionConfig::linear_weighted(f32::NAN, 1.0).validate().is_err());
        assert!(FusionConfig::linear_weighted(2.0, 3.0).validate().is_ok());
        assert!(fuse(&sv(&[1.0]), &sv(&[1.0]), &FusionConfig::rrf(0)).is_err());
    }

    #[test]
    fn test_strategy_string_forms() {
        assert_eq!(FusionStrategy::Rrf.to_string(), "rrf");
        assert_eq!("harmonic".parse::<FusionStrategy>().unwrap(), FusionStrategy::Harmonic);
        assert_eq!("max".parse::<FusionStrategy>().unwrap(), FusionStrategy::Max);
        assert!("borda".parse::<FusionStrategy>().is_err());
    }
}
