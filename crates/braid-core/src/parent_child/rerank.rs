//! Reranking parents with a semantic scorer.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{BraidError, BraidResult};
use crate::traits::{Reranker, SemanticScorer};
use crate::types::ResolvedMatch;

/// Rescores each parent's full content with a [`SemanticScorer`].
///
/// Equal scores keep the incoming order. `similarity_score` still reports
/// the matched child.
pub struct ScorerReranker<S: SemanticScorer + ?Sized> {
    scorer: Arc<S>,
}

impl<S: SemanticScorer + ?Sized> ScorerReranker<S> {
    pub fn new(scorer: Arc<S>) -> Self {
        Self { scorer }
    }
}

#[async_trait]
impl<S: SemanticScorer + ?Sized> Reranker for ScorerReranker<S> {
    async fn rerank(
        &self,
        query: &str,
        matches: Vec<ResolvedMatch>,
        limit: Option<usize>,
    ) -> BraidResult<Vec<ResolvedMatch>> {
        if matches.is_empty() {
            return Ok(matches);
        }

        let texts: Vec<String> = matches.iter().map(|m| m.parent_content.clone()).collect();
        let scores = self.scorer.score(query, &texts).await?;
        if scores.len() != texts.len() {
            return Err(BraidError::length_mismatch(
                "rerank scores",
                texts.len(),
                scores.len(),
            ));
        }

        let mut slots: Vec<Option<ResolvedMatch>> = matches.into_iter().map(Some).collect();
        let limit = limit.unwrap_or(slots.len());
        let reranked: Vec<ResolvedMatch> = scores
            .ranking()
            .into_iter()
            .filter_map(|idx| slots[idx].take())
            .take(limit)
            .collect();

        debug!(
            model = self.scorer.model_name(),
            kept = reranked.len(),
            "parents reranked"
        );
        Ok(reranked)
    }

    fn model_name(&self) -> &str {
        self.scorer.model_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ScoreVector;

    /// Scores a text by its length.
    struct LengthScorer;

    #[async_trait]
    impl SemanticScorer for LengthScorer {
        async fn score(&self, _: &str, texts: &[String]) -> BraidResult<ScoreVector> {
            ScoreVector::new(texts.iter().map(|t| t.len() as f32).collect())
        }

        fn model_name(&self) -> &str {
            "length"
        }
    }

    struct ShortScorer;

    #[async_trait]
    impl SemanticScorer for ShortScorer {
        async fn score(&self, _: &str, _: &[String]) -> BraidResult<ScoreVector> {
            ScoreVector::new(vec![1.0])
        }
    }

    fn resolved(parent_id: &str, content: &str) -> ResolvedMatch {
        ResolvedMatch {
            parent_id: parent_id.to_string(),
            parent_content: content.to_string(),
            similarity_score: 0.5,
            matched_child_id: format!("{parent_id}_child_0"),
            matched_child_content: String::new(),
        }
    }

    #[tokio::test]
    async fn test_reorders_by_parent_score_and_truncates() {
        let reranker = ScorerReranker::new(Arc::new(LengthScorer));
        let matches = vec![
            resolved("a", "short"),
            resolved("b", "the longest parent"),
            resolved("c", "medium one"),
        ];

        let reranked = reranker.rerank("q", matches, Some(2)).await.unwrap();

        let ids: Vec<_> = reranked.iter().map(|m| m.parent_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
        assert_eq!(reranker.model_name(), "length");
    }

    #[tokio::test]
    async fn test_ties_keep_incoming_order() {
        let reranker = ScorerReranker::new(Arc::new(LengthScorer));
        let matches = vec![resolved("x", "abc"), resolved("y", "def")];

        let reranked = reranker.rerank("q", matches, None).await.unwrap();

        assert_eq!(reranked[0].parent_id, "x");
        assert_eq!(reranked[1].parent_id, "y");
    }

    #[tokio::test]
    async fn test_misaligned_scores_are_rejected() {
        let reranker = ScorerReranker::new(Arc::new(ShortScorer));
        let matches = vec![resolved("x", "abc"), resolved("y", "def")];

        let err = reranker.rerank("q", matches, None).await.unwrap_err();
        assert!(err.is_contract_violation());
    }

    #[tokio::test]
    async fn test_empty_input_skips_scorer() {
        let reranker = ScorerReranker::new(Arc::new(ShortScorer));
        let reranked = reranker.rerank("q", Vec::new(), Some(2)).await.unwrap();
        assert!(reranked.is_empty());
    }
}
