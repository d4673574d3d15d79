//! Cross-cutting, shared constants.
//!
//! The score key order derived from [`DEFAULT_NGRAM_LENGTH`] is the feature order a trained
//! classifier expects, so changing these defaults invalidates existing classifier artifacts.

/// Longest n-gram length scored by default (lengths `1..=5`).
pub const DEFAULT_NGRAM_LENGTH: usize = 5;

/// Number of pairs in one work bundle (the unit of dispatch and retry).
pub const DEFAULT_BUNDLE_SIZE: usize = 1000;

/// Rows fetched per page by the input cursor.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Maximum number of synonyms kept per `(lemma, pos)`.
pub const MAX_SYNONYMS: usize = 10;

/// Per-worker bound on memoized synonym lookups.
pub const DEFAULT_SYNONYM_CACHE_CAPACITY: u64 = 200_000;

/// Per-worker bound on memoized annotated documents and n-gram indices.
pub const DEFAULT_DOCUMENT_CACHE_CAPACITY: u64 = 4_096;

/// Default output database path.
pub const DEFAULT_OUTPUT_PATH: &str = "predictions.db";

/// Default name of the candidate collection.
pub const DEFAULT_CANDIDATE_TABLE: &str = "texts";

/// Name of the source collection.
pub const SOURCE_TABLE: &str = "sources";

/// Name of the output collection.
pub const PREDICTIONS_TABLE: &str = "predictions";

/// Score key of the hapax legomena metric.
pub const HAPAX_KEY: &str = "hapax";

/// Suffix appended to n-gram lengths for modified-scorer keys (`"3_mod"`).
pub const MODIFIED_KEY_SUFFIX: &str = "_mod";
