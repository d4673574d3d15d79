use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("database not found at path: {path}")]
    NotFound { path: PathBuf },

    #[error("invalid table name: {name}")]
    InvalidTableName { name: String },

    #[error("table {name} does not exist")]
    MissingTable { name: String },

    #[error("table {table} has no row at position {position}")]
    Truncated { table: String, position: u64 },

    #[error("invalid row range: {reason}")]
    InvalidRange { reason: String },

    #[error("failed to (de)serialize scores: {reason}")]
    Serialization { reason: String },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization {
            reason: err.to_string(),
        }
    }
}
