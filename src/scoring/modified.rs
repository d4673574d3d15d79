//! Frequency-weighted, paraphrase-tolerant n-gram containment.
//!
//! Every candidate n-gram occurrence is expanded into an [`ExpansionSet`]:
//!
//! 1. its own lemma tuple,
//! 2. the Cartesian product of its synonym slots (content words with a non-empty synonym set
//!    become [`Slot::Alternatives`], everything else stays [`Slot::Fixed`]),
//! 3. for n ≥ 3, every variant from (1) and (2) with one interior position deleted.
//!
//! The variants' counts in the source index are summed into the occurrence's expected count,
//! which is clamped by the occurrence's own count in the candidate. Duplicated variants are
//! kept and counted each time: a token without synonyms yields the same tuple from (1) and
//! (2), doubling its weight.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::annotation::{Pos, Token};
use crate::constants::MODIFIED_KEY_SUFFIX;
use crate::hashing::LemmaId;
use crate::ngram::{DocumentNgrams, Ngram, windows};
use crate::synonyms::SynonymCache;

use super::error::ScoringError;
use super::types::{ScoreVector, containment_ratio};

#[derive(Debug, Clone, PartialEq, Eq)]
/// One position of an n-gram template.
pub enum Slot {
    /// Single lemma value.
    Fixed(LemmaId),
    /// Any of several interchangeable lemma values.
    Alternatives(Arc<[LemmaId]>),
}

impl Slot {
    fn values(&self) -> &[LemmaId] {
        match self {
            Slot::Fixed(id) => std::slice::from_ref(id),
            Slot::Alternatives(ids) => ids,
        }
    }
}

/// Expands a template into every single-valued n-gram, one per combination of alternatives.
///
/// The last slot varies fastest. A template with an empty [`Slot::Alternatives`] yields nothing.
pub fn flatten(slots: &[Slot]) -> Vec<Ngram> {
    if slots.is_empty() {
        return Vec::new();
    }

    let total: usize = slots.iter().map(|s| s.values().len()).product();
    let mut out = Vec::with_capacity(total);
    if total == 0 {
        return out;
    }

    let mut cursor = vec![0usize; slots.len()];
    loop {
        out.push(
            slots
                .iter()
                .zip(&cursor)
                .map(|(slot, &i)| slot.values()[i])
                .collect(),
        );

        // Odometer increment from the last slot.
        let mut pos = slots.len();
        loop {
            if pos == 0 {
                return out;
            }
            pos -= 1;
            cursor[pos] += 1;
            if cursor[pos] < slots[pos].values().len() {
                break;
            }
            cursor[pos] = 0;
        }
    }
}

/// Variants of `ngram` with one interior position removed, in position order.
///
/// Yields `n - 2` n-grams of length `n - 1` for `n >= 3`, nothing otherwise.
pub fn skipgrams(ngram: &[LemmaId]) -> impl Iterator<Item = Ngram> + '_ {
    let interior = if ngram.len() >= 3 {
        1..ngram.len() - 1
    } else {
        1..1
    };

    interior.map(move |skip| {
        ngram
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != skip)
            .map(|(_, id)| *id)
            .collect()
    })
}

/// Single-valued variants derived from one candidate n-gram. Not deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionSet {
    variants: Vec<Ngram>,
}

impl ExpansionSet {
    pub fn variants(&self) -> &[Ngram] {
        &self.variants
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Sum of every variant's count in `source` (each looked up at its own length).
    pub fn expected_count(&self, source: &DocumentNgrams) -> u64 {
        self.variants
            .iter()
            .map(|variant| u64::from(source.count(variant)))
            .sum()
    }
}

/// Modified n-gram containment scorer. Holds the worker's synonym cache.
#[derive(Debug)]
pub struct ModifiedScorer {
    max_n: usize,
    synonyms: SynonymCache,
}

impl ModifiedScorer {
    pub fn new(max_n: usize, synonyms: SynonymCache) -> Self {
        Self { max_n, synonyms }
    }

    pub fn max_n(&self) -> usize {
        self.max_n
    }

    pub fn synonyms(&self) -> &SynonymCache {
        &self.synonyms
    }

    /// Builds the synonym template of an n-gram.
    pub fn synonym_slots(&self, ngram: &[Token]) -> Result<Vec<Slot>, ScoringError> {
        ngram
            .iter()
            .map(|token| {
                let synonyms = self.synonyms.resolve(token)?;
                Ok(if synonyms.is_empty() {
                    Slot::Fixed(token.lemma_id())
                } else {
                    Slot::Alternatives(synonyms)
                })
            })
            .collect()
    }

    /// Expands one candidate n-gram occurrence.
    pub fn expand(&self, ngram: &[Token]) -> Result<ExpansionSet, ScoringError> {
        let identity: Ngram = ngram.iter().map(Token::lemma_id).collect();
        let slots = self.synonym_slots(ngram)?;

        let mut variants = vec![identity];
        variants.extend(flatten(&slots));

        if ngram.len() >= 3 {
            let skipped: Vec<Ngram> = variants.iter().flat_map(|v| skipgrams(v)).collect();
            variants.extend(skipped);
        }

        Ok(ExpansionSet { variants })
    }

    /// Containment score for n-gram length `n`.
    ///
    /// `candidate` must be the index of `candidate_tokens`. Each positional occurrence adds
    /// `min(expected, actual)` to the numerator and `actual` to the denominator, where
    /// `actual` is the occurrence's n-gram count in the candidate itself.
    pub fn containment(
        &self,
        source: &DocumentNgrams,
        candidate_tokens: &[Token],
        candidate: &DocumentNgrams,
        n: usize,
    ) -> Result<f64, ScoringError> {
        let mut total_contain: u64 = 0;
        let mut total_bcount: u64 = 0;

        // Expected counts only depend on (lemma, pos) per position.
        let mut expected_memo: HashMap<Vec<(LemmaId, Pos)>, u64> = HashMap::new();

        for window in windows(candidate_tokens, n) {
            let lemma_gram: Vec<LemmaId> = window.iter().map(Token::lemma_id).collect();
            let actual = u64::from(candidate.count(&lemma_gram));

            let memo_key: Vec<(LemmaId, Pos)> =
                window.iter().map(|t| (t.lemma_id(), t.pos())).collect();
            let expected = match expected_memo.get(&memo_key) {
                Some(expected) => *expected,
                None => {
                    let expected = self.expand(window)?.expected_count(source);
                    expected_memo.insert(memo_key, expected);
                    expected
                }
            };

            total_contain += expected.min(actual);
            total_bcount += actual;
        }

        debug!(
            n = n,
            total_contain = total_contain,
            total_bcount = total_bcount,
            distinct = expected_memo.len(),
            "Modified containment"
        );

        Ok(containment_ratio(total_contain, total_bcount))
    }

    /// Scores lengths `1..=max_n` under keys `"{n}_mod"`.
    pub fn score(
        &self,
        source: &DocumentNgrams,
        candidate_tokens: &[Token],
        candidate: &DocumentNgrams,
    ) -> Result<ScoreVector, ScoringError> {
        if candidate.lemmas().len() != candidate_tokens.len() {
            return Err(ScoringError::InvalidInput {
                reason: format!(
                    "candidate index covers {} lemmas but {} tokens were given",
                    candidate.lemmas().len(),
                    candidate_tokens.len()
                ),
            });
        }

        let mut scores = ScoreVector::with_capacity(self.max_n);
        for n in 1..=self.max_n {
            let score = self.containment(source, candidate_tokens, candidate, n)?;
            scores.insert(format!("{}{}", n, MODIFIED_KEY_SUFFIX), score);
        }
        Ok(scores)
    }
}
