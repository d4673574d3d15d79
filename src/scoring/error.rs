use thiserror::Error;

use crate::annotation::AnnotationError;
use crate::synonyms::SynonymError;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("annotation error: {0}")]
    Annotation(#[from] AnnotationError),

    #[error("synonym lookup error: {0}")]
    Synonym(#[from] SynonymError),

    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },
}
