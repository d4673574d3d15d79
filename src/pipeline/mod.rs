//! Batch scoring of the source × candidate cross product.
//!
//! Rows are grouped into [`WorkBundle`]s of `bundle_size` consecutive rows, bundles into
//! batches of one bundle per worker. A batch is fully drained before the next one starts, and
//! each finished bundle is committed on its own, so a run can be resumed from the first row
//! of any uncommitted bundle.

pub mod bundle;
pub mod error;
pub mod runner;
pub mod worker;

pub use bundle::{Bundler, PairTask, WorkBundle, next_batch};
pub use error::{DataError, PipelineError, Stage};
pub use runner::{PairScoringPipeline, RunSummary};
pub use worker::{BundleOutcome, Worker, WorkerContext, WorkerPool};

use crate::annotation::Language;
use crate::constants::{
    DEFAULT_BUNDLE_SIZE, DEFAULT_DOCUMENT_CACHE_CAPACITY, DEFAULT_NGRAM_LENGTH, DEFAULT_PAGE_SIZE,
    DEFAULT_SYNONYM_CACHE_CAPACITY,
};

/// Number of worker threads used when none is configured.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Tuning knobs of a [`PairScoringPipeline`] run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    pub language: Language,
    /// Highest n-gram length scored. Default: `5`.
    pub ngram_length: usize,
    /// Also compute the `"{n}_mod"` scores.
    pub use_modified: bool,
    /// Rows per bundle. Default: `1000`.
    pub bundle_size: usize,
    /// Candidate rows fetched per query. Default: `1000`.
    pub page_size: usize,
    pub workers: usize,
    pub synonym_cache_capacity: u64,
    pub document_cache_capacity: u64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            language: Language::default(),
            ngram_length: DEFAULT_NGRAM_LENGTH,
            use_modified: false,
            bundle_size: DEFAULT_BUNDLE_SIZE,
            page_size: DEFAULT_PAGE_SIZE,
            workers: default_workers(),
            synonym_cache_capacity: DEFAULT_SYNONYM_CACHE_CAPACITY,
            document_cache_capacity: DEFAULT_DOCUMENT_CACHE_CAPACITY,
        }
    }
}

impl PipelineSettings {
    pub fn validate(&self) -> Result<(), String> {
        let sizes = [
            ("ngram_length", self.ngram_length),
            ("bundle_size", self.bundle_size),
            ("page_size", self.page_size),
            ("workers", self.workers),
        ];
        for (name, value) in sizes {
            if value == 0 {
                return Err(format!("{} must be greater than 0", name));
            }
        }
        Ok(())
    }
}
