use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SynonymError {
    #[error("lexical resource not found at path: {path}")]
    ResourceNotFound { path: PathBuf },

    #[error("malformed lexical resource line {line} in {path}: {reason}")]
    MalformedResource {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("lexical resource unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
