//! Synonym lookup for the modified n-gram scorer.
//!
//! The lexical resource itself is external and reached through [`SynonymResolver`]. Each
//! worker wraps the shared resolver in its own [`SynonymCache`], which applies the
//! normalization rules and hashes synonyms into [`LemmaId`](crate::hashing::LemmaId)s.

pub mod cache;
pub mod error;
pub mod thesaurus;

pub use cache::{SynonymCache, normalize_synonyms};
pub use error::SynonymError;
pub use thesaurus::ThesaurusResolver;

use crate::annotation::{Language, Pos};

/// Sense-inventory lookup: alternate lemmas for a lemma in a part-of-speech category.
///
/// Implementations may return the original lemma, duplicates, multi-word entries and more
/// than the capped number of entries; [`SynonymCache`] normalizes the result.
pub trait SynonymResolver: Send + Sync {
    fn language(&self) -> Language;

    fn lookup(&self, lemma: &str, pos: Pos) -> Result<Vec<String>, SynonymError>;
}

#[cfg(any(test, feature = "mock"))]
pub use mock::MockSynonymResolver;

#[cfg(any(test, feature = "mock"))]
mod mock {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::RwLock;

    use super::{SynonymError, SynonymResolver};
    use crate::annotation::{Language, Pos};

    /// In-memory resolver that counts lookups and can be switched into a failing state.
    #[derive(Default)]
    pub struct MockSynonymResolver {
        language: Language,
        entries: RwLock<HashMap<(String, Pos), Vec<String>>>,
        failure: RwLock<Option<String>>,
        lookups: AtomicUsize,
    }

    impl MockSynonymResolver {
        pub fn new(language: Language) -> Self {
            Self {
                language,
                ..Self::default()
            }
        }

        pub fn insert(&self, lemma: &str, pos: Pos, synonyms: &[&str]) {
            self.entries.write().insert(
                (lemma.to_string(), pos),
                synonyms.iter().map(|s| s.to_string()).collect(),
            );
        }

        /// Makes every subsequent lookup fail with [`SynonymError::Unavailable`].
        pub fn fail_with(&self, reason: &str) {
            *self.failure.write() = Some(reason.to_string());
        }

        pub fn lookups(&self) -> usize {
            self.lookups.load(Ordering::Relaxed)
        }
    }

    impl SynonymResolver for MockSynonymResolver {
        fn language(&self) -> Language {
            self.language
        }

        fn lookup(&self, lemma: &str, pos: Pos) -> Result<Vec<String>, SynonymError> {
            self.lookups.fetch_add(1, Ordering::Relaxed);

            if let Some(reason) = self.failure.read().as_ref() {
                return Err(SynonymError::Unavailable {
                    reason: reason.clone(),
                });
            }

            Ok(self
                .entries
                .read()
                .get(&(lemma.to_string(), pos))
                .cloned()
                .unwrap_or_default())
        }
    }
}
