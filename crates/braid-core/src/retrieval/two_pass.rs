//! Two-pass retrieval: hybrid recall, then semantic precision.
//!
//! Stage 1 scores the full candidate set with both the lexical and the
//! semantic scorer, fuses the two vectors and keeps the top N. Stage 2
//! re-scores only those N with the semantic scorer and orders them by that
//! score alone. The stages stay separate: stage 2 never sees lexical signal
//! and never starts before stage 1 has produced its cut.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BraidError, BraidResult};
use crate::traits::{LexicalScorer, SemanticScorer};
use crate::types::{Candidate, Document, RankedList, ScoreVector};

use super::fusion::{fuse, FusionConfig};

/// Configuration for two-pass retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TwoPassConfig {
    /// Candidates kept after stage 1.
    pub top_n: usize,
    /// Stage 1 fusion strategy; in a config file this comes from the
    /// top-level `fusion` section.
    #[serde(skip)]
    pub fusion: FusionConfig,
}

impl Default for TwoPassConfig {
    fn default() -> Self {
        Self {
            top_n: 5,
            fusion: FusionConfig::default(),
        }
    }
}

impl TwoPassConfig {
    /// Config keeping `top_n` candidates with linear fusion.
    pub fn with_top_n(top_n: usize) -> Self {
        Self {
            top_n,
            ..Default::default()
        }
    }

    /// Set the stage 1 fusion strategy.
    pub fn with_fusion(mut self, fusion: FusionConfig) -> Self {
        self.fusion = fusion;
        self
    }

    /// Validate configuration values are in valid ranges.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.top_n == 0 {
            return Err("top_n must be at least 1");
        }
        self.fusion.validate()
    }
}

/// Two-pass retriever over injected scorers.
pub struct TwoPassRetriever<L, S>
where
    L: LexicalScorer + ?Sized,
    S: SemanticScorer + ?Sized,
{
    lexical: Arc<L>,
    semantic: Arc<S>,
    config: TwoPassConfig,
}

impl<L, S> TwoPassRetriever<L, S>
where
    L: LexicalScorer + ?Sized,
    S: SemanticScorer + ?Sized,
{
    /// Create a retriever with the default configuration.
    pub fn new(lexical: Arc<L>, semantic: Arc<S>) -> Self {
        Self {
            lexical,
            semantic,
            config: TwoPassConfig::default(),
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: TwoPassConfig) -> Self {
        self.config = config;
        self
    }

    /// Current configuration.
    pub fn config(&self) -> &TwoPassConfig {
        &self.config
    }

    /// Run both stages and return the top N ordered by stage 2 score.
    ///
    /// The returned candidates carry their stage 2 (semantic) score.
    pub async fn retrieve(&self, query: &str, documents: &[Document]) -> BraidResult<Vec<Candidate>> {
        let shortlist = self.first_pass(query, documents).await?;
        self.second_pass(query, shortlist).await
    }

    /// Stage 1 only: fused scores, top N, ties by candidate-set order.
    pub async fn first_pass(
        &self,
        query: &str,
        documents: &[Document],
    ) -> BraidResult<Vec<Candidate>> {
        self.config.validate().map_err(BraidError::configuration)?;
        RankedList::new(documents.iter().map(|d| d.id.as_str()))?;

        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let texts: Vec<String> = documents.iter().map(|d| d.text.clone()).collect();

        // The two scorers are independent; run them concurrently.
        let (lexical, semantic) = tokio::try_join!(
            self.lexical.score(query, &texts),
            self.semantic.score(query, &texts)
        )?;
        check_len("lexical scores", texts.len(), &lexical)?;
        check_len("semantic scores", texts.len(), &semantic)?;

        let fused = fuse(&lexical, &semantic, &self.config.fusion)?;
        let shortlist: Vec<Candidate> = fused
            .ranking()
            .into_iter()
            .take(self.config.top_n)
            .map(|idx| Candidate::scored(&documents[idx], fused.as_slice()[idx]))
            .collect();

        debug!(
            candidates = documents.len(),
            kept = shortlist.len(),
            strategy = %self.config.fusion.strategy,
            "two-pass stage 1 complete"
        );
        Ok(shortlist)
    }

    /// Stage 2 only: semantic re-score of an already-cut shortlist.
    ///
    /// Equal stage 2 scores keep the shortlist order.
    pub async fn second_pass(
        &self,
        query: &str,
        shortlist: Vec<Candidate>,
    ) -> BraidResult<Vec<Candidate>> {
        if shortlist.is_empty() {
            return Ok(shortlist);
        }

        let texts: Vec<String> = shortlist.iter().map(|c| c.text.clone()).collect();
        let rescored = self.semantic.score(query, &texts).await?;
        check_len("stage 2 semantic scores", texts.len(), &rescored)?;

        let mut slots: Vec<Option<Candidate>> = shortlist.into_iter().map(Some).collect();
        let reordered: Vec<Candidate> = rescored
            .ranking()
            .into_iter()
            .filter_map(|idx| {
                slots[idx].take().map(|mut candidate| {
                    candidate.score = rescored.as_slice()[idx];
                    candidate
                })
            })
            .collect();

        debug!(results = reordered.len(), "two-pass stage 2 complete");
        Ok(reordered)
    }
}

/// One-shot two-pass retrieval returning only the final ordering.
pub async fn two_pass_retrieve<L, S>(
    query: &str,
    documents: &[Document],
    lexical: Arc<L>,
    semantic: Arc<S>,
    top_n: usize,
) -> BraidResult<RankedList>
where
    L: LexicalScorer + ?Sized,
    S: SemanticScorer + ?Sized,
{
    let results = TwoPassRetriever::new(lexical, semantic)
        .with_config(TwoPassConfig::with_top_n(top_n))
        .retrieve(query, documents)
        .await?;
    RankedList::from_candidates(&results)
}

fn check_len(what: &str, expected: usize, scores: &ScoreVector) -> BraidResult<()> {
    if scores.len() != expected {
        return Err(BraidError::length_mismatch(what, expected, scores.len()));
    }
    Ok(())
}
