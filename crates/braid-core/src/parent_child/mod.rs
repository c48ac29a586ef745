//! Parent-child retrieval.
//!
//! Small child units are matched against the query; their larger parent
//! units are what the caller gets back. Provides:
//! - `ParentChildIndex`: the immutable child -> parent mapping and parent store
//! - `ParentResolver`: relevance gate, dedup by parent, similarity ordering
//! - `ParentChildRetriever`: child search followed by resolution and an
//!   optional rerank of the parents

mod index;
mod observer;
mod rerank;
mod resolver;
mod retriever;

pub use index::{
    sentence_windows, ParentChildIndex, ParentChildIndexBuilder, DEFAULT_SENTENCE_WINDOW,
};
pub use observer::{GapCounter, ResolutionObserver, TracingObserver};
pub use rerank::ScorerReranker;
pub use resolver::{
    resolve_parents, ParentResolver, ResolverConfig, DEFAULT_CHILD_K, DEFAULT_RELEVANCE_THRESHOLD,
    DEFAULT_RERANK_TOP_N,
};
pub use retriever::ParentChildRetriever;
