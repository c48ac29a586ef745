//! End-to-end parent-child retrieval over a child vector index.

use std::sync::Arc;

use tracing::debug;

use crate::error::{BraidError, BraidResult};
use crate::traits::{ChildSearcher, Reranker};
use crate::types::ResolvedMatch;

use super::index::ParentChildIndex;
use super::observer::ResolutionObserver;
use super::resolver::{ParentResolver, ResolverConfig};

/// Searches children, returns their parents.
///
/// With a [`Reranker`] attached, resolved parents are reordered against the
/// query and cut to `rerank_top_n`.
pub struct ParentChildRetriever<C: ChildSearcher + ?Sized> {
    searcher: Arc<C>,
    resolver: ParentResolver,
    reranker: Option<Arc<dyn Reranker>>,
    config: ResolverConfig,
}

impl<C: ChildSearcher + ?Sized> ParentChildRetriever<C> {
    /// Create a retriever with the default configuration.
    pub fn new(searcher: Arc<C>, index: Arc<ParentChildIndex>) -> Self {
        let config = ResolverConfig::default();
        Self {
            searcher,
            resolver: ParentResolver::new(index).with_threshold(config.threshold),
            reranker: None,
            config,
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.resolver = self.resolver.with_threshold(config.threshold);
        self.config = config;
        self
    }

    /// Report mapping gaps to `observer`.
    pub fn with_observer(mut self, observer: Arc<dyn ResolutionObserver>) -> Self {
        self.resolver = self.resolver.with_observer(observer);
        self
    }

    /// Rerank resolved parents with `reranker`.
    pub fn with_reranker(mut self, reranker: Arc<dyn Reranker>) -> Self {
        self.reranker = Some(reranker);
        self
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Query `child_k` children, resolve them to parents, then rerank.
    pub async fn retrieve(&self, query: &str) -> BraidResult<Vec<ResolvedMatch>> {
        self.config.validate().map_err(BraidError::configuration)?;

        let hits = self
            .searcher
            .search_children(query, self.config.child_k)
            .await?;
        debug!(
            child_k = self.config.child_k,
            hits = hits.len(),
            "child search complete"
        );

        let matches = self.resolver.resolve(&hits)?;

        match &self.reranker {
            Some(reranker) => {
                debug!(
                    model = reranker.model_name(),
                    top_n = self.config.rerank_top_n,
                    "reranking parents"
                );
                reranker
                    .rerank(query, matches, Some(self.config.rerank_top_n))
                    .await
            }
            None => Ok(matches),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parent_child::ScorerReranker;
    use crate::traits::SemanticScorer;
    use crate::types::{ChildHit, ScoreVector};

    struct StaticSearcher(Vec<ChildHit>);

    #[async_trait::async_trait]
    impl ChildSearcher for StaticSearcher {
        async fn search_children(&self, _: &str, limit: usize) -> BraidResult<Vec<ChildHit>> {
            Ok(self.0.iter().take(limit).cloned().collect())
        }
    }

    struct DownSearcher;

    #[async_trait::async_trait]
    impl ChildSearcher for DownSearcher {
        async fn search_children(&self, _: &str, _: usize) -> BraidResult<Vec<ChildHit>> {
            Err(BraidError::child_search("index offline"))
        }
    }

    /// Prefers parents mentioning "Usage".
    struct UsageFirst;

    #[async_trait::async_trait]
    impl SemanticScorer for UsageFirst {
        async fn score(&self, _: &str, texts: &[String]) -> BraidResult<ScoreVector> {
            ScoreVector::new(
                texts
                    .iter()
                    .map(|t| if t.contains("Usage") { 1.0 } else { 0.1 })
                    .collect(),
            )
        }
    }

    fn index() -> Arc<ParentChildIndex> {
        Arc::new(
            ParentChildIndex::builder()
                .add_parent("intro", "Intro section.", ["intro a", "intro b"])
                .add_parent("usage", "Usage section.", ["usage a"])
                .build()
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_retrieve_resolves_parents() {
        let searcher = StaticSearcher(vec![
            ChildHit::new("usage_child_0", 0.2, "usage a"),
            ChildHit::new("intro_child_1", 0.35, "intro b"),
            ChildHit::new("intro_child_0", 0.5, "intro a"),
        ]);

        let results = ParentChildRetriever::new(Arc::new(searcher), index())
            .retrieve("how do I use it")
            .await
            .unwrap();

        let parents: Vec<_> = results.iter().map(|m| m.parent_id.as_str()).collect();
        assert_eq!(parents, vec!["usage", "intro"]);
        assert_eq!(results[1].matched_child_id, "intro_child_1");
    }

    #[tokio::test]
    async fn test_child_k_limits_search() {
        let searcher = StaticSearcher(vec![
            ChildHit::new("usage_child_0", 0.2, "usage a"),
            ChildHit::new("intro_child_1", 0.35, "intro b"),
        ]);

        let results = ParentChildRetriever::new(Arc::new(searcher), index())
            .with_config(ResolverConfig {
                child_k: 1,
                ..Default::default()
            })
            .retrieve("q")
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_configured_threshold_gates_query() {
        let searcher = StaticSearcher(vec![ChildHit::new("usage_child_0", 0.6, "usage a")]);

        let err = ParentChildRetriever::new(Arc::new(searcher), index())
            .with_config(ResolverConfig {
                threshold: 0.5,
                ..Default::default()
            })
            .retrieve("q")
            .await
            .unwrap_err();

        assert!(err.is_no_relevant_results());
    }

    #[tokio::test]
    async fn test_search_failure_propagates() {
        let err = ParentChildRetriever::new(Arc::new(DownSearcher), index())
            .retrieve("q")
            .await
            .unwrap_err();
        assert!(matches!(err, BraidError::ChildSearch { .. }));
    }

    #[tokio::test]
    async fn test_reranker_reorders_and_cuts_parents() {
        let searcher = StaticSearcher(vec![
            ChildHit::new("intro_child_0", 0.1, "intro a"),
            ChildHit::new("usage_child_0", 0.3, "usage a"),
        ]);

        let results = ParentChildRetriever::new(Arc::new(searcher), index())
            .with_config(ResolverConfig {
                rerank_top_n: 1,
                ..Default::default()
            })
            .with_reranker(Arc::new(ScorerReranker::new(Arc::new(UsageFirst))))
            .retrieve("q")
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].parent_id, "usage");
        assert!((results[0].similarity_score - 0.7).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_rejected_query_skips_reranker() {
        let searcher = StaticSearcher(vec![ChildHit::new("usage_child_0", 0.9, "usage a")]);

        let err = ParentChildRetriever::new(Arc::new(searcher), index())
            .with_config(ResolverConfig {
                threshold: 0.5,
                ..Default::default()
            })
            .with_reranker(Arc::new(ScorerReranker::new(Arc::new(UsageFirst))))
            .retrieve("q")
            .await
            .unwrap_err();

        assert!(err.is_no_relevant_results());
    }
}
