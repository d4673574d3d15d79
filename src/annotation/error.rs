use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("unsupported language '{language}' (expected 'de' or 'en')")]
    UnsupportedLanguage { language: String },

    #[error("lexicon not found at path: {path}")]
    LexiconNotFound { path: PathBuf },

    #[error("malformed lexicon line {line} in {path}: {reason}")]
    MalformedLexicon {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("annotation service unavailable: {reason}")]
    ServiceUnavailable { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
