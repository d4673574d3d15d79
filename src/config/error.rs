//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable held a value that could not be parsed.
    #[error("failed to parse {name}='{value}': {reason}")]
    ParseError {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// Language code other than `de` or `en`.
    #[error("unsupported language: {value}")]
    UnsupportedLanguage { value: String },

    /// A setting without default was not provided.
    #[error("missing required setting: {name}")]
    MissingSetting { name: &'static str },

    /// A numeric setting is out of range.
    #[error("invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },

    /// Specified path does not exist on the filesystem.
    #[error("path does not exist: {path}")]
    PathNotFound { path: PathBuf },

    /// Path exists but is not a file (when a file was expected).
    #[error("path is not a file: {path}")]
    NotAFile { path: PathBuf },
}
