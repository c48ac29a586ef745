//! Scorer traits - lexical and semantic relevance providers.

use async_trait::async_trait;

use crate::error::BraidResult;
use crate::types::ScoreVector;

/// Term-overlap relevance (BM25 or similar) between a query and documents.
#[async_trait]
pub trait LexicalScorer: Send + Sync {
    /// Score every text against the query.
    ///
    /// Must return exactly one score per text, in the same order.
    async fn score(&self, query: &str, texts: &[String]) -> BraidResult<ScoreVector>;
}

/// Dense-embedding relevance (cosine similarity or similar).
#[async_trait]
pub trait SemanticScorer: Send + Sync {
    /// Score every text against the query.
    ///
    /// Must return exactly one score per text, in the same order.
    async fn score(&self, query: &str, texts: &[String]) -> BraidResult<ScoreVector>;

    /// Get the model name.
    fn model_name(&self) -> &str {
        "unknown"
    }
}
