//! Immutable child-to-parent mapping.
//!
//! Built once before any query is served and shared read-only (via `Arc`)
//! by every resolver afterwards.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{BraidError, BraidResult};
use crate::types::{ChildUnit, ParentUnit};

/// Sentences on each side of the center sentence in a window parent.
pub const DEFAULT_SENTENCE_WINDOW: usize = 3;

/// Lookup from child ids to parent ids, and from parent ids to parent text.
#[derive(Debug, Clone, Default)]
pub struct ParentChildIndex {
    child_to_parent: HashMap<String, String>,
    parent_store: HashMap<String, String>,
    children: Vec<ChildUnit>,
}

impl ParentChildIndex {
    /// Start building an index parent by parent.
    pub fn builder() -> ParentChildIndexBuilder {
        ParentChildIndexBuilder::default()
    }

    /// Build from explicit units.
    ///
    /// Every child must reference an existing parent, and ids must be unique
    /// among parents and among children.
    pub fn from_units(parents: Vec<ParentUnit>, children: Vec<ChildUnit>) -> BraidResult<Self> {
        let mut parent_store = HashMap::with_capacity(parents.len());
        for parent in parents {
            if parent_store.contains_key(&parent.id) {
                return Err(BraidError::duplicate_id(&parent.id));
            }
            parent_store.insert(parent.id, parent.text);
        }

        let mut child_to_parent = HashMap::with_capacity(children.len());
        for child in &children {
            if !parent_store.contains_key(&child.parent_id) {
                return Err(BraidError::orphan_child(&child.id, &child.parent_id));
            }
            if child_to_parent
                .insert(child.id.clone(), child.parent_id.clone())
                .is_some()
            {
                return Err(BraidError::duplicate_id(&child.id));
            }
        }

        debug!(
            parents = parent_store.len(),
            children = children.len(),
            "built parent-child index"
        );
        Ok(Self {
            child_to_parent,
            parent_store,
            children,
        })
    }

    /// Wrap mappings produced elsewhere.
    ///
    /// Dangling parent references are kept; they surface as mapping gaps at
    /// query time. Children built this way carry no text.
    pub fn from_maps(
        child_to_parent: HashMap<String, String>,
        parent_store: HashMap<String, String>,
    ) -> Self {
        let mut children: Vec<ChildUnit> = child_to_parent
            .iter()
            .map(|(child, parent)| ChildUnit::new(child.as_str(), parent.as_str(), ""))
            .collect();
        children.sort_by(|a, b| a.id.cmp(&b.id));

        Self {
            child_to_parent,
            parent_store,
            children,
        }
    }

    /// Index of sliding sentence windows over one document.
    pub fn sentence_windows<S: AsRef<str>>(
        doc_id: &str,
        sentences: &[S],
        window: usize,
    ) -> BraidResult<Self> {
        let (parents, children) = sentence_windows(doc_id, sentences, window);
        Self::from_units(parents, children)
    }

    /// Parent id of a child.
    pub fn parent_of(&self, child_id: &str) -> Option<&str> {
        self.child_to_parent.get(child_id).map(String::as_str)
    }

    /// Text of a parent.
    pub fn parent_text(&self, parent_id: &str) -> Option<&str> {
        self.parent_store.get(parent_id).map(String::as_str)
    }

    /// All children, for feeding a vector index.
    ///
    /// An index built with [`from_maps`](Self::from_maps) only knows child
    /// ids; its children have empty `text` and cannot be embedded from here.
    pub fn children(&self) -> &[ChildUnit] {
        &self.children
    }

    pub fn parent_count(&self) -> usize {
        self.parent_store.len()
    }

    pub fn child_count(&self) -> usize {
        self.child_to_parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.child_to_parent.is_empty()
    }
}

/// Builder for [`ParentChildIndex`].
#[derive(Debug, Default)]
pub struct ParentChildIndexBuilder {
    parents: Vec<ParentUnit>,
    children: Vec<ChildUnit>,
}

impl ParentChildIndexBuilder {
    /// Add a parent and its children; child ids are `{parent_id}_child_{i}`.
    pub fn add_parent<I, S>(mut self, id: impl Into<String>, text: impl Into<String>, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let id = id.into();
        self.children.extend(
            children
                .into_iter()
                .enumerate()
                .map(|(i, child)| ChildUnit::new(format!("{id}_child_{i}"), id.as_str(), child)),
        );
        self.parents.push(ParentUnit::new(id, text));
        self
    }

    /// Add a child with an explicit id.
    pub fn add_child(mut self, child: ChildUnit) -> Self {
        self.children.push(child);
        self
    }

    /// Add sentence windows for one document.
    pub fn add_sentence_windows<S: AsRef<str>>(
        mut self,
        doc_id: &str,
        sentences: &[S],
        window: usize,
    ) -> Self {
        let (parents, children) = sentence_windows(doc_id, sentences, window);
        self.parents.extend(parents);
        self.children.extend(children);
        self
    }

    /// Validate and build.
    pub fn build(self) -> BraidResult<ParentChildIndex> {
        ParentChildIndex::from_units(self.parents, self.children)
    }
}

/// Split a document's sentences into sentence children and window parents.
///
/// Sentence `i` becomes child `{doc_id}_sentence_{i}`; its parent
/// `{doc_id}_window_{i}` joins sentences `i - window ..= i + window`
/// (clipped to the document) with single spaces.
pub fn sentence_windows<S: AsRef<str>>(
    doc_id: &str,
    sentences: &[S],
    window: usize,
) -> (Vec<ParentUnit>, Vec<ChildUnit>) {
    let mut parents = Vec::with_capacity(sentences.len());
    let mut children = Vec::with_capacity(sentences.len());

    for (i, sentence) in sentences.iter().enumerate() {
        let start = i.saturating_sub(window);
        let end = i.saturating_add(window).min(sentences.len() - 1);
        let text = sentences[start..=end]
            .iter()
            .map(|s| s.as_ref())
            .collect::<Vec<&str>>()
            .join(" ");

        let parent_id = format!("{doc_id}_window_{i}");
        children.push(ChildUnit::new(
            format!("{doc_id}_sentence_{i}"),
            parent_id.as_str(),
            sentence.as_ref(),
        ));
        parents.push(ParentUnit::new(parent_id, text));
    }

    (parents, children)
}
