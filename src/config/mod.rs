//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `TEXTREUSE_*` environment variables; command-line
//! flags override both.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::annotation::Language;
use crate::constants::{
    DEFAULT_BUNDLE_SIZE, DEFAULT_CANDIDATE_TABLE, DEFAULT_DOCUMENT_CACHE_CAPACITY,
    DEFAULT_NGRAM_LENGTH, DEFAULT_OUTPUT_PATH, DEFAULT_PAGE_SIZE, DEFAULT_SYNONYM_CACHE_CAPACITY,
};
use crate::pipeline::{PipelineSettings, default_workers};
use crate::storage::validate_table_name;

/// Runner configuration.
///
/// Use [`Config::from_env`] to read `TEXTREUSE_*` overrides on top of defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Input SQLite database with `sources` and candidate tables. Required.
    pub input_path: Option<PathBuf>,

    /// Output SQLite database. Default: `predictions.db`.
    pub output_path: PathBuf,

    /// Linear classifier JSON artifact. Required.
    pub model_path: Option<PathBuf>,

    /// Optional `form<TAB>lemma<TAB>POS` lexicon for the built-in annotator.
    pub lexicon_path: Option<PathBuf>,

    /// `lemma<TAB>category<TAB>syn|syn` thesaurus. Required with `use_modified`.
    pub thesaurus_path: Option<PathBuf>,

    /// Default: `de`.
    pub language: Language,

    /// Default: `texts`.
    pub candidate_table: String,

    /// Worker threads. Default: available parallelism.
    pub workers: usize,

    /// First row (inclusive) to process.
    pub start: Option<u64>,

    /// Last row (exclusive) to process.
    pub end: Option<u64>,

    /// Compute modified n-gram scores as well.
    pub use_modified: bool,

    /// Highest n-gram length. Default: `5`.
    pub ngram_length: usize,

    /// Rows per work bundle. Default: `1000`.
    pub bundle_size: usize,

    /// Candidate rows per input query. Default: `1000`.
    pub page_size: usize,

    /// Per-worker synonym cache entries. Default: `200_000`.
    pub synonym_cache_capacity: u64,

    /// Per-worker analyzed document entries. Default: `4_096`.
    pub document_cache_capacity: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: None,
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            model_path: None,
            lexicon_path: None,
            thesaurus_path: None,
            language: Language::default(),
            candidate_table: DEFAULT_CANDIDATE_TABLE.to_string(),
            workers: default_workers(),
            start: None,
            end: None,
            use_modified: false,
            ngram_length: DEFAULT_NGRAM_LENGTH,
            bundle_size: DEFAULT_BUNDLE_SIZE,
            page_size: DEFAULT_PAGE_SIZE,
            synonym_cache_capacity: DEFAULT_SYNONYM_CACHE_CAPACITY,
            document_cache_capacity: DEFAULT_DOCUMENT_CACHE_CAPACITY,
        }
    }
}

impl Config {
    const ENV_NGRAM_LENGTH: &'static str = "TEXTREUSE_NGRAM_LENGTH";
    const ENV_BUNDLE_SIZE: &'static str = "TEXTREUSE_BUNDLE_SIZE";
    const ENV_PAGE_SIZE: &'static str = "TEXTREUSE_PAGE_SIZE";
    const ENV_SYNONYM_CACHE_CAPACITY: &'static str = "TEXTREUSE_SYNONYM_CACHE_CAPACITY";
    const ENV_DOCUMENT_CACHE_CAPACITY: &'static str = "TEXTREUSE_DOCUMENT_CACHE_CAPACITY";
    const ENV_OUTPUT_PATH: &'static str = "TEXTREUSE_OUTPUT_PATH";
    const ENV_LANGUAGE: &'static str = "TEXTREUSE_LANGUAGE";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let ngram_length = Self::parse_from_env(Self::ENV_NGRAM_LENGTH, defaults.ngram_length)?;
        let bundle_size = Self::parse_from_env(Self::ENV_BUNDLE_SIZE, defaults.bundle_size)?;
        let page_size = Self::parse_from_env(Self::ENV_PAGE_SIZE, defaults.page_size)?;
        let synonym_cache_capacity = Self::parse_from_env(
            Self::ENV_SYNONYM_CACHE_CAPACITY,
            defaults.synonym_cache_capacity,
        )?;
        let document_cache_capacity = Self::parse_from_env(
            Self::ENV_DOCUMENT_CACHE_CAPACITY,
            defaults.document_cache_capacity,
        )?;
        let output_path = Self::parse_path_from_env(Self::ENV_OUTPUT_PATH, defaults.output_path);
        let language = Self::parse_language_from_env(defaults.language)?;

        Ok(Self {
            output_path,
            language,
            ngram_length,
            bundle_size,
            page_size,
            synonym_cache_capacity,
            document_cache_capacity,
            ..defaults
        })
    }

    /// Validates paths and basic invariants (does not create files).
    pub fn validate(&self) -> Result<(), ConfigError> {
        let input = self
            .input_path
            .as_ref()
            .ok_or(ConfigError::MissingSetting { name: "input_path" })?;
        Self::require_file(input)?;

        let model = self
            .model_path
            .as_ref()
            .ok_or(ConfigError::MissingSetting { name: "model_path" })?;
        Self::require_file(model)?;

        if let Some(ref path) = self.lexicon_path {
            Self::require_file(path)?;
        }

        match self.thesaurus_path {
            Some(ref path) => Self::require_file(path)?,
            None if self.use_modified => {
                return Err(ConfigError::MissingSetting {
                    name: "thesaurus_path",
                });
            }
            None => {}
        }

        if self.output_path.is_dir() {
            return Err(ConfigError::NotAFile {
                path: self.output_path.clone(),
            });
        }

        let sizes = [
            ("ngram_length", self.ngram_length as u64),
            ("bundle_size", self.bundle_size as u64),
            ("page_size", self.page_size as u64),
            ("workers", self.workers as u64),
            ("synonym_cache_capacity", self.synonym_cache_capacity),
            ("document_cache_capacity", self.document_cache_capacity),
        ];
        for (name, value) in sizes {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    name,
                    reason: "must be greater than 0".to_string(),
                });
            }
        }

        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                return Err(ConfigError::InvalidValue {
                    name: "start",
                    reason: format!("start {} is after end {}", start, end),
                });
            }
        }

        validate_table_name(&self.candidate_table).map_err(|e| ConfigError::InvalidValue {
            name: "candidate_table",
            reason: e.to_string(),
        })?;

        Ok(())
    }

    /// Pipeline tuning derived from this configuration.
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            language: self.language,
            ngram_length: self.ngram_length,
            use_modified: self.use_modified,
            bundle_size: self.bundle_size,
            page_size: self.page_size,
            workers: self.workers,
            synonym_cache_capacity: self.synonym_cache_capacity,
            document_cache_capacity: self.document_cache_capacity,
        }
    }

    fn require_file(path: &Path) -> Result<(), ConfigError> {
        if !path.exists() {
            return Err(ConfigError::PathNotFound {
                path: path.to_path_buf(),
            });
        }
        if !path.is_file() {
            return Err(ConfigError::NotAFile {
                path: path.to_path_buf(),
            });
        }
        Ok(())
    }

    fn parse_from_env<T>(var_name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match env::var(var_name) {
            Ok(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::ParseError {
                name: var_name,
                reason: e.to_string(),
                value,
            }),
            Err(_) => Ok(default),
        }
    }

    fn parse_language_from_env(default: Language) -> Result<Language, ConfigError> {
        match env::var(Self::ENV_LANGUAGE) {
            Ok(value) => value
                .parse()
                .map_err(|_| ConfigError::UnsupportedLanguage { value }),
            Err(_) => Ok(default),
        }
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or(default)
    }
}
