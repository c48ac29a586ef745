//! Error types for braid operations.
//!
//! Three kinds of failure matter to callers of the retrieval core:
//! contract violations (caller bugs, abort the query), `NoRelevantResults`
//! (expected, the caller should handle it), and collaborator failures that
//! are passed through untouched. Mapping gaps between children and parents
//! are not errors at all; they go to a [`ResolutionObserver`].
//!
//! [`ResolutionObserver`]: crate::parent_child::ResolutionObserver

use thiserror::Error;

/// Result type alias for braid operations.
pub type BraidResult<T> = Result<T, BraidError>;

/// Main error type for all braid operations.
#[derive(Error, Debug)]
pub enum BraidError {
    /// Inputs violated a documented contract (misaligned vectors, duplicate ids, ...).
    #[error("Contract violation: {message}")]
    ContractViolation { message: String, code: ErrorCode },

    /// The best candidate did not clear the relevance threshold, or there were no candidates.
    #[error("No relevant results found (best distance: {best_distance:?}, threshold: {threshold})")]
    NoRelevantResults {
        best_distance: Option<f32>,
        threshold: f32,
    },

    /// A lexical or semantic scorer failed.
    #[error("Scorer error: {message}")]
    Scorer {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The child vector index query failed.
    #[error("Child search error: {message}")]
    ChildSearch {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Contract (CTR_xxx)
    CtrLengthMismatch,
    CtrDuplicateId,
    CtrNonFiniteScore,
    CtrOrphanChild,

    // Relevance (REL_xxx)
    RelBelowThreshold,

    // Scorer (SCR_xxx)
    ScrLexicalFailed,
    ScrSemanticFailed,

    // Child search (CHS_xxx)
    ChsQueryFailed,

    // Configuration (CFG_xxx)
    CfgInvalid,

    // Internal
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::CtrLengthMismatch => "CTR_001",
            ErrorCode::CtrDuplicateId => "CTR_002",
            ErrorCode::CtrNonFiniteScore => "CTR_003",
            ErrorCode::CtrOrphanChild => "CTR_004",
            ErrorCode::RelBelowThreshold => "REL_001",
            ErrorCode::ScrLexicalFailed => "SCR_001",
            ErrorCode::ScrSemanticFailed => "SCR_002",
            ErrorCode::ChsQueryFailed => "CHS_001",
            ErrorCode::CfgInvalid => "CFG_001",
            ErrorCode::Internal => "INT_001",
        }
    }
}

impl BraidError {
    /// Two aligned inputs had different lengths.
    pub fn length_mismatch(what: &str, expected: usize, actual: usize) -> Self {
        Self::ContractViolation {
            message: format!("{what}: expected length {expected}, got {actual}"),
            code: ErrorCode::CtrLengthMismatch,
        }
    }

    /// An identifier appeared twice where uniqueness is required.
    pub fn duplicate_id(id: impl AsRef<str>) -> Self {
        Self::ContractViolation {
            message: format!("duplicate identifier '{}'", id.as_ref()),
            code: ErrorCode::CtrDuplicateId,
        }
    }

    /// A score was NaN or infinite.
    pub fn non_finite_score(index: usize, value: f32) -> Self {
        Self::ContractViolation {
            message: format!("score at position {index} is not finite ({value})"),
            code: ErrorCode::CtrNonFiniteScore,
        }
    }

    /// A child references a parent that does not exist.
    pub fn orphan_child(child_id: impl AsRef<str>, parent_id: impl AsRef<str>) -> Self {
        Self::ContractViolation {
            message: format!(
                "child '{}' references unknown parent '{}'",
                child_id.as_ref(),
                parent_id.as_ref()
            ),
            code: ErrorCode::CtrOrphanChild,
        }
    }

    /// Nothing cleared the relevance threshold.
    pub fn no_relevant_results(best_distance: Option<f32>, threshold: f32) -> Self {
        Self::NoRelevantResults {
            best_distance,
            threshold,
        }
    }

    /// Create a lexical scorer error.
    pub fn lexical_scorer(message: impl Into<String>) -> Self {
        Self::Scorer {
            message: message.into(),
            code: ErrorCode::ScrLexicalFailed,
            source: None,
        }
    }

    /// Create a semantic scorer error.
    pub fn semantic_scorer(message: impl Into<String>) -> Self {
        Self::Scorer {
            message: message.into(),
            code: ErrorCode::ScrSemanticFailed,
            source: None,
        }
    }

    /// Create a child search error.
    pub fn child_search(message: impl Into<String>) -> Self {
        Self::ChildSearch {
            message: message.into(),
            code: ErrorCode::ChsQueryFailed,
            source: None,
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Whether this is the recoverable "nothing relevant" condition.
    pub fn is_no_relevant_results(&self) -> bool {
        matches!(self, Self::NoRelevantResults { .. })
    }

    /// Whether this error is a caller bug rather than a runtime condition.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::ContractViolation { .. })
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::ContractViolation { code, .. } => *code,
            Self::NoRelevantResults { .. } => ErrorCode::RelBelowThreshold,
            Self::Scorer { code, .. } => *code,
            Self::ChildSearch { code, .. } => *code,
            Self::Configuration(_) => ErrorCode::CfgInvalid,
            _ => ErrorCode::Internal,
        }
    }

    /// Get a user-friendly suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::NoRelevantResults { .. } => Some("Try rephrasing the query"),
            Self::Scorer { .. } => Some("Please check the scorer backend"),
            Self::ChildSearch { .. } => Some("Please check the vector index backend"),
            Self::Configuration(_) => Some("Please check the retrieval configuration"),
            _ => None,
        }
    }
}
