//! braid-core - Hybrid retrieval core for braid.
//!
//! This crate merges lexical and semantic rankings over a candidate set into
//! one consensus ranking, and resolves fine-grained child matches back to the
//! parent units that carry their context. Scorers and the child vector index
//! are injected through the traits in [`traits`].
//!
//! # Example
//!
//! ```ignore
//! use braid_core::{ParentChildIndex, ParentChildRetriever, TwoPassRetriever};
//!
//! // Two-pass: fused recall, then semantic rerank of the top 5
//! let retriever = TwoPassRetriever::new(lexical, semantic);
//! let results = retriever.retrieve("what is rrf", &documents).await?;
//!
//! // Parent-child: match sentences, return their windows
//! let index = Arc::new(ParentChildIndex::sentence_windows("doc", &sentences, 3)?);
//! let matches = ParentChildRetriever::new(searcher, index).retrieve("what is rrf").await?;
//! ```

pub mod config;
pub mod error;
pub mod parent_child;
pub mod retrieval;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use config::BraidConfig;
pub use error::{BraidError, BraidResult, ErrorCode};
pub use parent_child::{
    resolve_parents, GapCounter, ParentChildIndex, ParentChildRetriever, ParentResolver,
    ResolutionObserver, ResolverConfig, ScorerReranker, TracingObserver,
};
pub use retrieval::{
    expand_query, fuse, fuse_ranks, normalize, two_pass_retrieve, FusionConfig, FusionStrategy,
    HybridConfig, HybridRetriever, LinearFusion, MultiQueryRetriever, RrfFusion, TwoPassConfig,
    TwoPassRetriever,
};
pub use traits::{ChildSearcher, LexicalScorer, Reranker, SemanticScorer};
pub use types::{
    Candidate, ChildHit, ChildUnit, Document, ParentUnit, RankedList, ResolvedMatch, ScoreVector,
};
