//! Ordered identifier lists produced by retrievers and rank fusion.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{BraidError, BraidResult};

use super::candidate::Candidate;

/// Identifiers ordered best-first (rank 1 = index 0), without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct RankedList(Vec<String>);

impl RankedList {
    /// Create a ranked list, rejecting duplicate identifiers.
    pub fn new<I, S>(ids: I) -> BraidResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        let mut seen = HashSet::with_capacity(ids.len());
        for id in &ids {
            if !seen.insert(id.as_str()) {
                return Err(BraidError::duplicate_id(id));
            }
        }
        Ok(Self(ids))
    }

    /// Wrap ids that are unique by construction.
    pub(crate) fn from_unique(ids: Vec<String>) -> Self {
        debug_assert_eq!(ids.iter().collect::<HashSet<_>>().len(), ids.len());
        Self(ids)
    }

    /// Ranked list of candidate ids, in the candidates' order.
    pub fn from_candidates(candidates: &[Candidate]) -> BraidResult<Self> {
        Self::new(candidates.iter().map(|c| c.id.clone()))
    }

    /// 1-based rank of `id`, if present.
    pub fn rank_of(&self, id: &str) -> Option<usize> {
        self.0.iter().position(|x| x == id).map(|idx| idx + 1)
    }

    /// Number of ranked ids.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate ids best-first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Keep only the best `len` ids.
    pub fn truncate(&mut self, len: usize) {
        self.0.truncate(len);
    }

    /// Borrow the ids.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Consume into the ids.
    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl TryFrom<Vec<String>> for RankedList {
    type Error = BraidError;

    fn try_from(ids: Vec<String>) -> BraidResult<Self> {
        Self::new(ids)
    }
}

impl From<RankedList> for Vec<String> {
    fn from(list: RankedList) -> Self {
        list.0
    }
}

impl<'a> IntoIterator for &'a RankedList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
