//! Candidate documents and their scored form.

use serde::{Deserialize, Serialize};

/// A document in the candidate set handed to the retrieval core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Identifier, unique within one retrieval call.
    pub id: String,
    /// Text content given to the scorers.
    pub text: String,
}

impl Document {
    /// Create a new document.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// A document together with the score it was ranked by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub text: String,
    /// Only comparable to scores from the same ranking pass.
    pub score: f32,
}

impl Candidate {
    /// Attach a score to a document.
    pub fn scored(document: &Document, score: f32) -> Self {
        Self {
            id: document.id.clone(),
            text: document.text.clone(),
            score,
        }
    }
}
