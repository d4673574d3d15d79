use std::fmt;

use thiserror::Error;

use crate::storage::{StorageError, WorkRange};

/// Phase of a run in which a fatal error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Setup,
    Scoring,
    Persistence,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Setup => "setup",
            Stage::Scoring => "scoring",
            Stage::Persistence => "persistence",
        };
        f.write_str(name)
    }
}

/// A malformed input row. The row is skipped and the run continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("row {row}: {reason}")]
pub struct DataError {
    pub row: u64,
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration error: {reason}")]
    Configuration { reason: String },

    #[error("resource unavailable: {reason}")]
    Resource { reason: String },

    #[error("failed to open database: {source}")]
    Open {
        #[source]
        source: StorageError,
    },

    #[error("failed to read rows {range}: {source}")]
    Read {
        range: WorkRange,
        #[source]
        source: StorageError,
    },

    #[error("bundle {range} failed: {reason}")]
    Worker { range: WorkRange, reason: String },

    #[error("failed to persist bundle {range}: {source}")]
    Persistence {
        range: WorkRange,
        #[source]
        source: StorageError,
    },
}

impl PipelineError {
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Configuration { .. }
            | PipelineError::Resource { .. }
            | PipelineError::Open { .. } => Stage::Setup,
            PipelineError::Read { .. } | PipelineError::Worker { .. } => Stage::Scoring,
            PipelineError::Persistence { .. } => Stage::Persistence,
        }
    }

    /// Rows last attempted when the error occurred, if the run had started.
    pub fn row_range(&self) -> Option<WorkRange> {
        match self {
            PipelineError::Read { range, .. }
            | PipelineError::Worker { range, .. }
            | PipelineError::Persistence { range, .. } => Some(*range),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_and_range() {
        let range = WorkRange::new(1000, 2000).unwrap();

        let worker = PipelineError::Worker {
            range,
            reason: "boom".into(),
        };
        assert_eq!(worker.stage(), Stage::Scoring);
        assert_eq!(worker.row_range(), Some(range));
        assert_eq!(worker.to_string(), "bundle [1000, 2000) failed: boom");

        let config = PipelineError::Configuration {
            reason: "bad".into(),
        };
        assert_eq!(config.stage(), Stage::Setup);
        assert_eq!(config.row_range(), None);

        let persist = PipelineError::Persistence {
            range,
            source: StorageError::Serialization {
                reason: "x".into(),
            },
        };
        assert_eq!(persist.stage(), Stage::Persistence);
        assert_eq!(persist.stage().to_string(), "persistence");
    }
}
