use std::collections::HashSet;
use std::hash::Hash;

use crate::constants::HAPAX_KEY;
use crate::ngram::{DocumentNgrams, NgramCounts};

use super::types::{ScoreVector, containment_ratio};

/// Set-based n-gram containment of a candidate within a source.
///
/// Repeated n-grams count once, so the metric ignores positions and frequencies.
#[derive(Debug, Clone, Copy)]
pub struct BaselineScorer {
    max_n: usize,
}

impl BaselineScorer {
    pub fn new(max_n: usize) -> Self {
        Self { max_n }
    }

    pub fn max_n(&self) -> usize {
        self.max_n
    }

    /// Scores lengths `1..=max_n` and the hapax legomena overlap.
    ///
    /// Lengths the documents were not indexed for score `0.0`.
    pub fn score(&self, source: &DocumentNgrams, candidate: &DocumentNgrams) -> ScoreVector {
        let mut scores = ScoreVector::with_capacity(self.max_n + 1);

        for n in 1..=self.max_n {
            let score = match (source.counts(n), candidate.counts(n)) {
                (Some(source), Some(candidate)) => ngram_containment(source, candidate),
                _ => 0.0,
            };
            scores.insert(n.to_string(), score);
        }

        scores.insert(HAPAX_KEY, set_containment(source.hapax(), candidate.hapax()));
        scores
    }
}

/// `|distinct(source) ∩ distinct(candidate)| / |distinct(candidate)|`.
pub fn ngram_containment(source: &NgramCounts, candidate: &NgramCounts) -> f64 {
    let shared = candidate
        .distinct()
        .filter(|gram| source.contains(gram))
        .count();
    containment_ratio(shared as u64, candidate.distinct_len() as u64)
}

/// `|source ∩ candidate| / |candidate|`, `0.0` for an empty candidate set.
pub fn set_containment<T: Eq + Hash>(source: &HashSet<T>, candidate: &HashSet<T>) -> f64 {
    let shared = candidate.iter().filter(|v| source.contains(v)).count();
    containment_ratio(shared as u64, candidate.len() as u64)
}
