use std::sync::Arc;

use tracing::debug;

use crate::annotation::Annotator;

use super::baseline::BaselineScorer;
use super::document::{AnalyzedDocument, DocumentCache, DocumentKey};
use super::error::ScoringError;
use super::modified::ModifiedScorer;
use super::types::{ScoreVector, feature_keys};

/// Scores (source, candidate) pairs with the baseline metric and, optionally, the modified one.
///
/// One instance lives inside each worker; its document and synonym caches are never shared.
pub struct PairScorer {
    annotator: Arc<dyn Annotator>,
    documents: DocumentCache,
    baseline: BaselineScorer,
    modified: Option<ModifiedScorer>,
}

impl std::fmt::Debug for PairScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PairScorer")
            .field("language", &self.annotator.language())
            .field("documents", &self.documents)
            .field("baseline", &self.baseline)
            .field("modified", &self.modified)
            .finish()
    }
}

impl PairScorer {
    pub fn new(
        annotator: Arc<dyn Annotator>,
        documents: DocumentCache,
        baseline: BaselineScorer,
        modified: Option<ModifiedScorer>,
    ) -> Result<Self, ScoringError> {
        let needed = modified
            .as_ref()
            .map_or(baseline.max_n(), |m| m.max_n().max(baseline.max_n()));
        if documents.max_n() < needed {
            return Err(ScoringError::InvalidInput {
                reason: format!(
                    "document index covers n-grams up to {} but scorers need {}",
                    documents.max_n(),
                    needed
                ),
            });
        }

        Ok(Self {
            annotator,
            documents,
            baseline,
            modified,
        })
    }

    /// Score keys in the order they appear in every produced [`ScoreVector`].
    pub fn feature_keys(&self) -> Vec<String> {
        feature_keys(self.baseline.max_n(), self.modified.is_some())
    }

    pub fn uses_modified(&self) -> bool {
        self.modified.is_some()
    }

    pub fn documents(&self) -> &DocumentCache {
        &self.documents
    }

    pub fn modified(&self) -> Option<&ModifiedScorer> {
        self.modified.as_ref()
    }

    /// Scores a pair, reusing cached analyses of both documents.
    pub fn score_pair(
        &self,
        source: (&DocumentKey, &str),
        candidate: (&DocumentKey, &str),
    ) -> Result<ScoreVector, ScoringError> {
        let source_doc = self
            .documents
            .get_or_analyze(source.0, source.1, self.annotator.as_ref())?;
        let candidate_doc =
            self.documents
                .get_or_analyze(candidate.0, candidate.1, self.annotator.as_ref())?;

        debug!(
            source = source.0.id(),
            candidate = candidate.0.id(),
            "Scoring pair"
        );

        self.score_documents(&source_doc, &candidate_doc)
    }

    /// Scores two raw texts without touching the document cache.
    pub fn score_texts(
        &self,
        source_text: &str,
        candidate_text: &str,
    ) -> Result<ScoreVector, ScoringError> {
        let max_n = self.documents.max_n();
        let source = AnalyzedDocument::analyze(self.annotator.as_ref(), source_text, max_n)?;
        let candidate = AnalyzedDocument::analyze(self.annotator.as_ref(), candidate_text, max_n)?;
        self.score_documents(&source, &candidate)
    }

    pub fn score_documents(
        &self,
        source: &AnalyzedDocument,
        candidate: &AnalyzedDocument,
    ) -> Result<ScoreVector, ScoringError> {
        let mut scores = self.baseline.score(source.ngrams(), candidate.ngrams());

        if let Some(modified) = &self.modified {
            scores.extend(modified.score(
                source.ngrams(),
                candidate.tokens(),
                candidate.ngrams(),
            )?);
        }

        Ok(scores)
    }
}
