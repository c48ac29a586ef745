//! Reranker trait for resolved parent matches.

use async_trait::async_trait;

use crate::error::BraidResult;
use crate::types::ResolvedMatch;

/// Reorders resolved parents against the query, usually with a cross-encoder.
#[async_trait]
pub trait Reranker: Send + Sync {
    /// Rerank matches by relevance to the query, keeping at most `limit`.
    async fn rerank(
        &self,
        query: &str,
        matches: Vec<ResolvedMatch>,
        limit: Option<usize>,
    ) -> BraidResult<Vec<ResolvedMatch>>;

    /// Get the model name.
    fn model_name(&self) -> &str;
}
