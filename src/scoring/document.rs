use std::sync::Arc;

use moka::sync::Cache;
use tracing::debug;

use crate::annotation::{Annotator, Token, lemma_ids};
use crate::constants::DEFAULT_DOCUMENT_CACHE_CAPACITY;
use crate::ngram::DocumentNgrams;

use super::error::ScoringError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Input collection a document belongs to.
pub enum Collection {
    Source,
    Candidate,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Stable logical identity of a document: its collection and its id within it.
pub struct DocumentKey {
    collection: Collection,
    id: Arc<str>,
}

impl DocumentKey {
    pub fn new(collection: Collection, id: &str) -> Self {
        Self {
            collection,
            id: Arc::from(id),
        }
    }

    pub fn source(id: &str) -> Self {
        Self::new(Collection::Source, id)
    }

    pub fn candidate(id: &str) -> Self {
        Self::new(Collection::Candidate, id)
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Annotated tokens of a document together with its n-gram index.
#[derive(Debug, Clone, Default)]
pub struct AnalyzedDocument {
    tokens: Vec<Token>,
    ngrams: DocumentNgrams,
}

impl AnalyzedDocument {
    pub fn new(tokens: Vec<Token>, max_n: usize) -> Self {
        let ngrams = DocumentNgrams::build(lemma_ids(&tokens), max_n);
        Self { tokens, ngrams }
    }

    pub fn analyze(
        annotator: &dyn Annotator,
        text: &str,
        max_n: usize,
    ) -> Result<Self, ScoringError> {
        Ok(Self::new(annotator.annotate(text)?, max_n))
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn ngrams(&self) -> &DocumentNgrams {
        &self.ngrams
    }
}

/// Worker-local memo of analyzed documents keyed by [`DocumentKey`].
///
/// Entries are immutable once inserted. Callers reusing a key for different text must
/// [`invalidate`](Self::invalidate) it first.
pub struct DocumentCache {
    max_n: usize,
    entries: Cache<DocumentKey, Arc<AnalyzedDocument>>,
}

impl std::fmt::Debug for DocumentCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentCache")
            .field("max_n", &self.max_n)
            .field("entries", &self.entries.entry_count())
            .finish()
    }
}

impl DocumentCache {
    pub fn new(max_n: usize) -> Self {
        Self::with_capacity(max_n, DEFAULT_DOCUMENT_CACHE_CAPACITY)
    }

    pub fn with_capacity(max_n: usize, capacity: u64) -> Self {
        Self {
            max_n,
            entries: Cache::builder().max_capacity(capacity).build(),
        }
    }

    /// Returns the cached analysis of `key`, analyzing `text` on a miss.
    pub fn get_or_analyze(
        &self,
        key: &DocumentKey,
        text: &str,
        annotator: &dyn Annotator,
    ) -> Result<Arc<AnalyzedDocument>, ScoringError> {
        if let Some(doc) = self.entries.get(key) {
            return Ok(doc);
        }

        let doc = Arc::new(AnalyzedDocument::analyze(annotator, text, self.max_n)?);
        debug!(
            collection = ?key.collection(),
            id = key.id(),
            tokens = doc.tokens().len(),
            "Analyzed document"
        );

        self.entries.insert(key.clone(), Arc::clone(&doc));
        Ok(doc)
    }

    pub fn contains(&self, key: &DocumentKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn invalidate(&self, key: &DocumentKey) {
        self.entries.invalidate(key);
    }

    pub fn clear(&self) {
        self.entries.invalidate_all();
    }

    pub fn len(&self) -> u64 {
        self.entries.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.entry_count() == 0
    }

    pub fn max_n(&self) -> usize {
        self.max_n
    }

    /// Runs any pending maintenance tasks in the underlying cache.
    pub fn run_pending_tasks(&self) {
        self.entries.run_pending_tasks();
    }
}
