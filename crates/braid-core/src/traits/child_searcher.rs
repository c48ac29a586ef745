//! Child index search trait.

use async_trait::async_trait;

use crate::error::BraidResult;
use crate::types::ChildHit;

/// Vector-index query over child units.
#[async_trait]
pub trait ChildSearcher: Send + Sync {
    /// Return up to `limit` children, most similar first.
    ///
    /// Distances follow the index's convention: 0 = identical, larger = less similar.
    async fn search_children(&self, query: &str, limit: usize) -> BraidResult<Vec<ChildHit>>;
}
