//! N-gram extraction and per-document n-gram indices.
//!
//! N-grams are standard sliding windows over a lemma sequence (no padding, no wraparound).
//! A [`DocumentNgrams`] holds the occurrence counts of every length `1..=N` plus the hapax
//! legomena set, and is read-only once built.

use std::collections::{HashMap, HashSet};

use crate::hashing::LemmaId;

/// A single-valued n-gram.
pub type Ngram = Box<[LemmaId]>;

/// Yields the overlapping windows of length `n` over `seq`, in positional order.
///
/// Yields nothing when `n` is zero or longer than the sequence.
pub fn windows<T>(seq: &[T], n: usize) -> impl Iterator<Item = &[T]> {
    let count = if n == 0 || n > seq.len() {
        0
    } else {
        seq.len() - n + 1
    };
    (0..count).map(move |i| &seq[i..i + n])
}

/// Occurrence counts of the n-grams of one length within one document.
#[derive(Debug, Clone, Default)]
pub struct NgramCounts {
    n: usize,
    counts: HashMap<Ngram, u32>,
    total: usize,
}

impl NgramCounts {
    pub fn from_sequence(seq: &[LemmaId], n: usize) -> Self {
        let mut counts: HashMap<Ngram, u32> = HashMap::new();
        let mut total = 0;
        for window in windows(seq, n) {
            *counts.entry(Ngram::from(window)).or_insert(0) += 1;
            total += 1;
        }
        Self { n, counts, total }
    }

    /// N-gram length of this index.
    #[inline]
    pub fn n(&self) -> usize {
        self.n
    }

    /// Occurrence count of `ngram`, zero when absent.
    #[inline]
    pub fn count(&self, ngram: &[LemmaId]) -> u32 {
        self.counts.get(ngram).copied().unwrap_or(0)
    }

    #[inline]
    pub fn contains(&self, ngram: &[LemmaId]) -> bool {
        self.counts.contains_key(ngram)
    }

    /// Iterates the distinct n-grams (set view).
    pub fn distinct(&self) -> impl Iterator<Item = &[LemmaId]> {
        self.counts.keys().map(|k| &**k)
    }

    /// Number of distinct n-grams.
    #[inline]
    pub fn distinct_len(&self) -> usize {
        self.counts.len()
    }

    /// Number of n-gram occurrences (windows).
    #[inline]
    pub fn total(&self) -> usize {
        self.total
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// N-gram index of one document for lengths `1..=max_n`.
#[derive(Debug, Clone, Default)]
pub struct DocumentNgrams {
    lemmas: Vec<LemmaId>,
    by_length: Vec<NgramCounts>,
    hapax: HashSet<LemmaId>,
}

impl DocumentNgrams {
    pub fn build(lemmas: Vec<LemmaId>, max_n: usize) -> Self {
        let by_length: Vec<NgramCounts> = (1..=max_n)
            .map(|n| NgramCounts::from_sequence(&lemmas, n))
            .collect();

        let hapax = by_length
            .first()
            .map(|unigrams| {
                unigrams
                    .counts
                    .iter()
                    .filter(|(_, count)| **count == 1)
                    .map(|(gram, _)| gram[0])
                    .collect()
            })
            .unwrap_or_default();

        Self {
            lemmas,
            by_length,
            hapax,
        }
    }

    /// Longest indexed n-gram length.
    #[inline]
    pub fn max_n(&self) -> usize {
        self.by_length.len()
    }

    /// Counts for length `n` (1-based), `None` outside `1..=max_n`.
    #[inline]
    pub fn counts(&self, n: usize) -> Option<&NgramCounts> {
        n.checked_sub(1).and_then(|idx| self.by_length.get(idx))
    }

    /// Occurrence count of `ngram` in the index of its own length.
    #[inline]
    pub fn count(&self, ngram: &[LemmaId]) -> u32 {
        self.counts(ngram.len())
            .map(|c| c.count(ngram))
            .unwrap_or(0)
    }

    /// Positional windows of length `n` over the document's lemmas.
    pub fn windows(&self, n: usize) -> impl Iterator<Item = &[LemmaId]> {
        windows(&self.lemmas, n)
    }

    /// Lemmas occurring exactly once in the document.
    #[inline]
    pub fn hapax(&self) -> &HashSet<LemmaId> {
        &self.hapax
    }

    #[inline]
    pub fn lemmas(&self) -> &[LemmaId] {
        &self.lemmas
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lemmas.is_empty()
    }
}
