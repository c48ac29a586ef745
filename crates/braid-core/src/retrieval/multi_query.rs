//! Multi-query retrieval via template query expansion.
//!
//! A query is rewritten into a few phrasings, every phrasing ranks the
//! documents through the semantic scorer, and the rankings are merged with
//! RRF. Documents that rank well under several phrasings float to the top.

use std::sync::Arc;

use futures::future::try_join_all;
use tracing::debug;

use crate::error::{BraidError, BraidResult};
use crate::traits::SemanticScorer;
use crate::types::{Document, RankedList};

use super::fusion::{RrfFusion, DEFAULT_RRF_K};
use super::hybrid::semantic_ranking;

const EXPANSION_SUFFIXES: [&str; 3] = ["meaning", "explanation", "related concepts"];

/// Rewrite a query into alternative phrasings, the original first.
pub fn expand_query(query: &str) -> Vec<String> {
    std::iter::once(query.to_string())
        .chain(EXPANSION_SUFFIXES.iter().map(|suffix| format!("{query} {suffix}")))
        .collect()
}

/// Semantic retrieval over every expansion of a query, fused by rank.
pub struct MultiQueryRetriever<S: SemanticScorer + ?Sized> {
    semantic: Arc<S>,
    rrf_k: u32,
}

impl<S: SemanticScorer + ?Sized> MultiQueryRetriever<S> {
    pub fn new(semantic: Arc<S>) -> Self {
        Self {
            semantic,
            rrf_k: DEFAULT_RRF_K,
        }
    }

    /// Set the RRF constant.
    pub fn with_rrf_k(mut self, rrf_k: u32) -> Self {
        self.rrf_k = rrf_k;
        self
    }

    /// Top `limit` document ids across all expansions of `query`.
    pub async fn retrieve(
        &self,
        query: &str,
        documents: &[Document],
        limit: usize,
    ) -> BraidResult<RankedList> {
        if self.rrf_k == 0 {
            return Err(BraidError::configuration("rrf_k must be a positive integer"));
        }
        RankedList::new(documents.iter().map(|d| d.id.as_str()))?;

        if documents.is_empty() || limit == 0 {
            return Ok(RankedList::default());
        }

        let queries = expand_query(query);
        let texts: Vec<String> = documents.iter().map(|d| d.text.clone()).collect();

        let scores = try_join_all(queries.iter().map(|q| self.semantic.score(q, &texts))).await?;
        let rankings = scores
            .iter()
            .map(|s| semantic_ranking(documents, s, documents.len()))
            .collect::<BraidResult<Vec<_>>>()?;

        let mut fused = RrfFusion::new(self.rrf_k).fuse(&rankings);
        fused.truncate(limit);

        debug!(
            expansions = queries.len(),
            model = self.semantic.model_name(),
            results = fused.len(),
            "multi-query fusion complete"
        );
        Ok(fused)
    }
}
