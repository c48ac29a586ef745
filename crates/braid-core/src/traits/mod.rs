//! Capability traits implemented by external collaborators.

mod child_searcher;
mod reranker;
mod scorer;

pub use child_searcher::*;
pub use reranker::*;
pub use scorer::*;
