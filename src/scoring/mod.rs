//! N-gram containment scoring.
//!
//! - [`BaselineScorer`]: set containment per n-gram length plus hapax legomena overlap.
//! - [`ModifiedScorer`]: frequency-weighted containment with synonym and skip-gram expansion.
//! - [`PairScorer`]: combines both over cached [`AnalyzedDocument`]s and produces the
//!   [`ScoreVector`] handed to the classifier.
//!
//! # Containment Direction
//!
//! Every metric measures how much of the *candidate* is found in the *source*: denominators
//! come from the candidate side. Swapping the arguments changes the score.

pub mod baseline;
pub mod document;
pub mod error;
pub mod modified;
pub mod scorer;
pub mod types;

#[cfg(test)]
mod tests;

pub use baseline::{BaselineScorer, ngram_containment, set_containment};
pub use document::{AnalyzedDocument, Collection, DocumentCache, DocumentKey};
pub use error::ScoringError;
pub use modified::{ExpansionSet, ModifiedScorer, Slot, flatten, skipgrams};
pub use scorer::PairScorer;
pub use types::{
    ScoreVector, baseline_keys, containment_ratio, feature_keys, modified_keys,
};
