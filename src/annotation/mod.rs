//! Tokenization, lemmatization and part-of-speech tagging.
//!
//! Annotation is an external concern: the pipeline only relies on the [`Annotator`] trait.
//! [`LexiconAnnotator`] is the built-in implementation used by the CLI.

pub mod error;
pub mod lexicon;
pub mod types;

pub use error::AnnotationError;
pub use lexicon::{LexiconAnnotator, words};
pub use types::{Language, Pos, Token, lemma_ids};

/// Converts raw text into an ordered token sequence.
///
/// Implementations are shared read-only by all workers.
pub trait Annotator: Send + Sync {
    /// Language this annotator was built for.
    fn language(&self) -> Language;

    /// Annotates `text`. An empty text yields an empty sequence.
    fn annotate(&self, text: &str) -> Result<Vec<Token>, AnnotationError>;
}
