//! Retrieval module: score fusion and ranked retrieval over scored documents.
//!
//! Provides three retrieval flows over injected scorers:
//! - Two-pass: fused lexical + semantic recall, then semantic rerank of the top N
//! - Hybrid: keyword and semantic rankings merged with RRF
//! - Multi-query: semantic rankings of query expansions merged with RRF

mod fusion;
mod hybrid;
mod multi_query;
mod normalize;
mod two_pass;

pub use fusion::{
    fuse, fuse_ranks, harmonic, max_blend, FusionConfig, FusionStrategy, LinearFusion, RrfFusion,
    DEFAULT_RRF_K, HARMONIC_EPSILON,
};
pub use hybrid::{keyword_ranking, semantic_ranking, HybridConfig, HybridRetriever};
pub use multi_query::{expand_query, MultiQueryRetriever};
pub use normalize::normalize;
pub use two_pass::{two_pass_retrieve, TwoPassConfig, TwoPassRetriever};
