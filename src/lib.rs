//! Textreuse library crate (used by the runner binary and integration tests).
//!
//! Detects text reuse between a *source* and a *candidate* text from shared n-grams and
//! labels every (source, candidate) pair with a pretrained classifier.
//!
//! # Public API Surface
//!
//! ## Scoring
//! - [`BaselineScorer`] - distinct n-gram containment per length plus hapax overlap
//! - [`ModifiedScorer`] - frequency-weighted containment with synonym and skip-gram expansion
//! - [`PairScorer`], [`ScoreVector`] - combined, ordered score vectors
//!
//! ## Linguistic Collaborators
//! - [`Annotator`], [`LexiconAnnotator`] - tokens with lemma and part of speech
//! - [`SynonymResolver`], [`ThesaurusResolver`], [`SynonymCache`] - synonym lookup
//! - [`Classifier`], [`LinearClassifier`] - score vector to label
//!
//! ## Batch Pipeline
//! - [`InputStore`], [`ResultStore`], [`WorkRange`] - SQLite input and idempotent output
//! - [`PairScoringPipeline`], [`PipelineError`] - parallel, resumable batch runs
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod annotation;
pub mod classifier;
pub mod config;
pub mod constants;
pub mod hashing;
pub mod ngram;
pub mod pipeline;
pub mod scoring;
pub mod storage;
pub mod synonyms;

pub use annotation::{AnnotationError, Annotator, Language, LexiconAnnotator, Pos, Token};
#[cfg(any(test, feature = "mock"))]
pub use classifier::MockClassifier;
pub use classifier::{Classifier, ClassifierError, LinearClassifier};
pub use config::{Config, ConfigError};
pub use hashing::{LemmaId, hash_lemma, hash_to_u64};
pub use ngram::{DocumentNgrams, Ngram, NgramCounts};
pub use pipeline::{
    DataError, PairScoringPipeline, PipelineError, PipelineSettings, RunSummary, Stage,
};
pub use scoring::{
    BaselineScorer, DocumentCache, DocumentKey, ModifiedScorer, PairScorer, ScoreVector,
    ScoringError, feature_keys,
};
pub use storage::{InputStore, PairRecord, ResultStore, StorageError, WorkRange};
#[cfg(any(test, feature = "mock"))]
pub use synonyms::MockSynonymResolver;
pub use synonyms::{SynonymCache, SynonymError, SynonymResolver, ThesaurusResolver};
