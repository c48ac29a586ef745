//! Parent and child retrieval units.

use serde::{Deserialize, Serialize};

/// A coarse, context-bearing unit returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentUnit {
    pub id: String,
    pub text: String,
}

impl ParentUnit {
    /// Create a new parent unit.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// A fine-grained unit indexed for matching, owned by exactly one parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildUnit {
    pub id: String,
    pub parent_id: String,
    pub text: String,
}

impl ChildUnit {
    /// Create a new child unit.
    pub fn new(id: impl Into<String>, parent_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id: parent_id.into(),
            text: text.into(),
        }
    }
}

/// One row of a vector-index query over children.
///
/// Distance semantics: 0 = identical, larger = less similar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildHit {
    pub child_id: String,
    pub distance: f32,
    /// Child text as stored in the index.
    pub content: String,
}

impl ChildHit {
    /// Create a new child hit.
    pub fn new(child_id: impl Into<String>, distance: f32, content: impl Into<String>) -> Self {
        Self {
            child_id: child_id.into(),
            distance,
            content: content.into(),
        }
    }

    /// Similarity in [0, 1] derived as `1 - distance`.
    pub fn similarity(&self) -> f32 {
        distance_to_similarity(self.distance)
    }
}

/// A parent surfaced for a query, annotated with its best-matching child.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedMatch {
    pub parent_id: String,
    pub parent_content: String,
    /// Similarity of the matched child, in [0, 1].
    pub similarity_score: f32,
    pub matched_child_id: String,
    pub matched_child_content: String,
}

/// Convert a distance to a similarity in [0, 1], rounded to 4 decimals.
pub fn distance_to_similarity(distance: f32) -> f32 {
    let similarity = (1.0 - distance).clamp(0.0, 1.0);
    (similarity * 10_000.0).round() / 10_000.0
}
