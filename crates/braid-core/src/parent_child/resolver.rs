//! Child-to-parent resolution with a relevance gate and parent dedup.
//!
//! Children are matched for precision but parents are returned for context.
//! The resolver:
//! 1. Rejects the query with `NoRelevantResults` when there are no hits or
//!    the best hit's distance is above the threshold
//! 2. Walks hits in rank order, keeping the first (best) child per parent
//! 3. Orders the surviving parents by similarity, ties in rank order

use std::collections::HashSet;
use std::sync::Arc;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BraidError, BraidResult};
use crate::types::{ChildHit, ResolvedMatch};

use super::index::ParentChildIndex;
use super::observer::{ResolutionObserver, TracingObserver};

/// Default maximum distance for the best hit.
pub const DEFAULT_RELEVANCE_THRESHOLD: f32 = 1.0;

/// Default number of children requested from the index.
pub const DEFAULT_CHILD_K: usize = 5;

/// Default number of parents kept after reranking.
pub const DEFAULT_RERANK_TOP_N: usize = 2;

/// Parent-child resolution settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Maximum distance of the best hit; equality passes.
    pub threshold: f32,
    /// Children requested per query.
    pub child_k: usize,
    /// Parents kept when a reranker is attached.
    pub rerank_top_n: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_RELEVANCE_THRESHOLD,
            child_k: DEFAULT_CHILD_K,
            rerank_top_n: DEFAULT_RERANK_TOP_N,
        }
    }
}

impl ResolverConfig {
    /// Validate configuration values are in valid ranges.
    pub fn validate(&self) -> Result<(), &'static str> {
        if !self.threshold.is_finite() {
            return Err("relevance threshold must be finite");
        }
        if self.child_k == 0 {
            return Err("child_k must be at least 1");
        }
        if self.rerank_top_n == 0 {
            return Err("rerank_top_n must be at least 1");
        }
        Ok(())
    }
}

/// Resolves ranked child hits into deduplicated parent matches.
#[derive(Clone)]
pub struct ParentResolver {
    index: Arc<ParentChildIndex>,
    observer: Arc<dyn ResolutionObserver>,
    threshold: f32,
}

impl ParentResolver {
    /// Resolver with the default threshold, logging mapping gaps.
    pub fn new(index: Arc<ParentChildIndex>) -> Self {
        Self {
            index,
            observer: Arc::new(TracingObserver),
            threshold: DEFAULT_RELEVANCE_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Report mapping gaps to `observer` instead of the log.
    pub fn with_observer(mut self, observer: Arc<dyn ResolutionObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn index(&self) -> &ParentChildIndex {
        &self.index
    }

    /// Resolve hits, best first, into at most one match per parent.
    pub fn resolve(&self, hits: &[ChildHit]) -> BraidResult<Vec<ResolvedMatch>> {
        if !self.threshold.is_finite() {
            return Err(BraidError::configuration("relevance threshold must be finite"));
        }
        check_hits(hits)?;

        let Some(best) = hits.first() else {
            return Err(BraidError::no_relevant_results(None, self.threshold));
        };
        if best.distance > self.threshold {
            debug!(
                best_distance = best.distance,
                threshold = self.threshold,
                "best child below relevance bar"
            );
            return Err(BraidError::no_relevant_results(
                Some(best.distance),
                self.threshold,
            ));
        }

        let mut seen: HashSet<&str> = HashSet::new();
        let mut matches = Vec::new();

        for hit in hits {
            let Some(parent_id) = self.index.parent_of(&hit.child_id) else {
                self.observer.on_missing_parent(&hit.child_id);
                continue;
            };
            if seen.contains(parent_id) {
                continue;
            }
            let Some(parent_text) = self.index.parent_text(parent_id) else {
                self.observer.on_missing_parent(&hit.child_id);
                continue;
            };

            seen.insert(parent_id);
            matches.push(ResolvedMatch {
                parent_id: parent_id.to_string(),
                parent_content: parent_text.to_string(),
                similarity_score: hit.similarity(),
                matched_child_id: hit.child_id.clone(),
                matched_child_content: hit.content.clone(),
            });
        }

        // every hit fell into a mapping gap
        if matches.is_empty() {
            return Err(BraidError::no_relevant_results(
                Some(best.distance),
                self.threshold,
            ));
        }

        // stable: equal similarity keeps rank order
        matches.sort_by_key(|m| std::cmp::Reverse(OrderedFloat(m.similarity_score)));

        debug!(
            hits = hits.len(),
            parents = matches.len(),
            "resolved child hits to parents"
        );
        Ok(matches)
    }
}

/// One-shot resolution against an index, mapping gaps logged.
pub fn resolve_parents(
    hits: &[ChildHit],
    index: Arc<ParentChildIndex>,
    threshold: f32,
) -> BraidResult<Vec<ResolvedMatch>> {
    ParentResolver::new(index)
        .with_threshold(threshold)
        .resolve(hits)
}

fn check_hits(hits: &[ChildHit]) -> BraidResult<()> {
    let mut ids = HashSet::with_capacity(hits.len());
    for (idx, hit) in hits.iter().enumerate() {
        if !hit.distance.is_finite() {
            return Err(BraidError::non_finite_score(idx, hit.distance));
        }
        if !ids.insert(hit.child_id.as_str()) {
            return Err(BraidError::duplicate_id(&hit.child_id));
        }
    }
    Ok(())
}
