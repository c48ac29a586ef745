//! Rank-level hybrid retrieval.
//!
//! Runs a keyword ranking and a semantic ranking over the same documents and
//! merges them with Reciprocal Rank Fusion. Unlike the score-based fusion in
//! two-pass retrieval, raw scores from the two scorers are never compared.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BraidError, BraidResult};
use crate::traits::{LexicalScorer, SemanticScorer};
use crate::types::{Document, RankedList, ScoreVector};

use super::fusion::{RrfFusion, DEFAULT_RRF_K};

/// Configuration for rank-level hybrid retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HybridConfig {
    /// Results taken from each retriever before fusion.
    pub top_k_each: usize,
    /// Results kept after fusion.
    pub final_k: usize,
    /// RRF constant.
    pub rrf_k: u32,
}

impl Default for HybridConfig {
    fn default() -> Self {
        Self {
            top_k_each: 5,
            final_k: 5,
            rrf_k: DEFAULT_RRF_K,
        }
    }
}

impl HybridConfig {
    /// Validate configuration values are in valid ranges.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.top_k_each == 0 || self.final_k == 0 {
            return Err("top_k_each and final_k must be at least 1");
        }
        if self.rrf_k == 0 {
            return Err("rrf_k must be a positive integer");
        }
        Ok(())
    }
}

/// Keyword + semantic retrieval fused by rank.
pub struct HybridRetriever<L, S>
where
    L: LexicalScorer + ?Sized,
    S: SemanticScorer + ?Sized,
{
    lexical: Arc<L>,
    semantic: Arc<S>,
    config: HybridConfig,
}

impl<L, S> HybridRetriever<L, S>
where
    L: LexicalScorer + ?Sized,
    S: SemanticScorer + ?Sized,
{
    /// Create a hybrid retriever with the default configuration.
    pub fn new(lexical: Arc<L>, semantic: Arc<S>) -> Self {
        Self {
            lexical,
            semantic,
            config: HybridConfig::default(),
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: HybridConfig) -> Self {
        self.config = config;
        self
    }

    /// Fused ranking using the configured `top_k_each` and `final_k`.
    pub async fn retrieve(&self, query: &str, documents: &[Document]) -> BraidResult<RankedList> {
        self.fused_ranking(query, documents, self.config.top_k_each, self.config.final_k)
            .await
    }

    /// Fused ranking of `documents` for `query`.
    ///
    /// Each scorer contributes at most `top_k_each` ids; at most `final_k`
    /// ids are returned.
    pub async fn fused_ranking(
        &self,
        query: &str,
        documents: &[Document],
        top_k_each: usize,
        final_k: usize,
    ) -> BraidResult<RankedList> {
        HybridConfig {
            top_k_each,
            final_k,
            rrf_k: self.config.rrf_k,
        }
        .validate()
        .map_err(BraidError::configuration)?;
        RankedList::new(documents.iter().map(|d| d.id.as_str()))?;

        if documents.is_empty() {
            return Ok(RankedList::default());
        }

        let texts: Vec<String> = documents.iter().map(|d| d.text.clone()).collect();
        let (lexical, semantic) = tokio::try_join!(
            self.lexical.score(query, &texts),
            self.semantic.score(query, &texts)
        )?;

        let keyword = keyword_ranking(documents, &lexical, top_k_each)?;
        let vector = semantic_ranking(documents, &semantic, top_k_each)?;

        let mut fused = RrfFusion::new(self.config.rrf_k).fuse(&[vector, keyword]);
        fused.truncate(final_k);

        debug!(
            candidates = documents.len(),
            keyword_hits = lexical.iter().filter(|s| *s > 0.0).count(),
            results = fused.len(),
            "hybrid rank fusion complete"
        );
        Ok(fused)
    }
}

/// Documents with a positive keyword score, best first, at most `limit`.
///
/// A document sharing no terms with the query is not a keyword hit at all.
pub fn keyword_ranking(
    documents: &[Document],
    scores: &ScoreVector,
    limit: usize,
) -> BraidResult<RankedList> {
    ranked_ids(documents, scores, limit, |score| score > 0.0)
}

/// All documents by semantic score, best first, at most `limit`.
pub fn semantic_ranking(
    documents: &[Document],
    scores: &ScoreVector,
    limit: usize,
) -> BraidResult<RankedList> {
    ranked_ids(documents, scores, limit, |_| true)
}

fn ranked_ids(
    documents: &[Document],
    scores: &ScoreVector,
    limit: usize,
    keep: impl Fn(f32) -> bool,
) -> BraidResult<RankedList> {
    if scores.len() != documents.len() {
        return Err(BraidError::length_mismatch(
            "document scores",
            documents.len(),
            scores.len(),
        ));
    }
    RankedList::new(
        scores
            .ranking()
            .into_iter()
            .filter(|&idx| keep(scores.as_slice()[idx]))
            .take(limit)
            .map(|idx| documents[idx].id.clone()),
    )
}
