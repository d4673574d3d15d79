use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("classifier artifact not found at path: {path}")]
    ModelNotFound { path: PathBuf },

    #[error("failed to load classifier artifact: {reason}")]
    ModelLoadFailed { reason: String },

    #[error("classifier expects {expected} features, got {actual}")]
    FeatureCountMismatch { expected: usize, actual: usize },

    #[error("classifier features do not match score keys: expected {expected:?}, got {actual:?}")]
    FeatureNamesMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    #[error("classifier prediction failed: {reason}")]
    PredictionFailed { reason: String },
}

impl From<std::io::Error> for ClassifierError {
    fn from(err: std::io::Error) -> Self {
        ClassifierError::ModelLoadFailed {
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ClassifierError {
    fn from(err: serde_json::Error) -> Self {
        ClassifierError::ModelLoadFailed {
            reason: format!("invalid artifact JSON: {}", err),
        }
    }
}
