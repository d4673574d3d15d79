use std::sync::Arc;

use moka::sync::Cache;
use tracing::debug;

use crate::annotation::{Language, Pos, Token};
use crate::constants::{DEFAULT_SYNONYM_CACHE_CAPACITY, MAX_SYNONYMS};
use crate::hashing::{LemmaId, hash_lemma};

use super::SynonymResolver;
use super::error::SynonymError;

/// Worker-local memo of resolved synonym sets, keyed by `(lemma, pos)`.
///
/// Values are the [`LemmaId`]s of the normalized synonyms (see [`normalize_synonyms`]). An
/// empty slice means "no expansion available". Capacity is bounded; evicted entries are
/// simply resolved again.
pub struct SynonymCache {
    resolver: Arc<dyn SynonymResolver>,
    language: Language,
    entries: Cache<(Arc<str>, Pos), Arc<[LemmaId]>>,
}

impl std::fmt::Debug for SynonymCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynonymCache")
            .field("language", &self.language)
            .field("entries", &self.entries.entry_count())
            .finish()
    }
}

impl SynonymCache {
    /// Creates a cache with the default capacity.
    pub fn new(resolver: Arc<dyn SynonymResolver>) -> Self {
        Self::with_capacity(resolver, DEFAULT_SYNONYM_CACHE_CAPACITY)
    }

    pub fn with_capacity(resolver: Arc<dyn SynonymResolver>, capacity: u64) -> Self {
        let language = resolver.language();
        Self {
            resolver,
            language,
            entries: Cache::builder().max_capacity(capacity).build(),
        }
    }

    /// Returns the synonym ids for `token`, resolving and memoizing on first use.
    ///
    /// Tokens whose part of speech is not a content word, or has no category in the
    /// resource's language, always resolve to an empty set without touching the resolver.
    pub fn resolve(&self, token: &Token) -> Result<Arc<[LemmaId]>, SynonymError> {
        let pos = token.pos();
        if !pos.is_content_word() || self.language.lexical_category(pos).is_none() {
            return Ok(Arc::from(Vec::new()));
        }

        let key = (token.shared_lemma(), pos);
        if let Some(ids) = self.entries.get(&key) {
            return Ok(ids);
        }

        let raw = self.resolver.lookup(token.lemma(), pos)?;
        let synonyms = normalize_synonyms(token.lemma(), raw);

        debug!(
            lemma = token.lemma(),
            pos = %pos,
            synonyms = synonyms.len(),
            "Resolved synonyms"
        );

        let ids: Arc<[LemmaId]> = synonyms.iter().map(|s| hash_lemma(s)).collect();
        self.entries.insert(key, Arc::clone(&ids));
        Ok(ids)
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Returns the number of memoized entries.
    pub fn len(&self) -> u64 {
        self.entries.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.entry_count() == 0
    }

    pub fn clear(&self) {
        self.entries.invalidate_all();
    }

    /// Runs any pending maintenance tasks in the underlying cache.
    pub fn run_pending_tasks(&self) {
        self.entries.run_pending_tasks();
    }
}

/// Normalizes a raw synonym list.
///
/// Drops the original lemma, empty and multi-word entries (`_` or whitespace), removes
/// duplicates, sorts lexicographically and keeps the first [`MAX_SYNONYMS`]. Sorting makes
/// the cap deterministic regardless of the resource's iteration order.
pub fn normalize_synonyms(lemma: &str, raw: Vec<String>) -> Vec<String> {
    let mut synonyms: Vec<String> = raw
        .into_iter()
        .filter(|s| !s.is_empty() && s != lemma)
        .filter(|s| !s.contains('_') && !s.contains(char::is_whitespace))
        .collect();

    synonyms.sort();
    synonyms.dedup();
    synonyms.truncate(MAX_SYNONYMS);
    synonyms
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synonyms::{MockSynonymResolver, ThesaurusResolver};

    fn owned(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_excludes_original_and_multiword() {
        let result = normalize_synonyms(
            "car",
            owned(&["auto", "car", "motor_vehicle", "police car", "", "auto"]),
        );
        assert_eq!(result, vec!["auto"]);
    }

    #[test]
    fn test_normalize_caps_and_sorts() {
        let raw: Vec<String> = (0..15).rev().map(|i| format!("syn{:02}", i)).collect();
        let result = normalize_synonyms("x", raw);

        assert_eq!(result.len(), MAX_SYNONYMS);
        assert_eq!(result[0], "syn00");
        assert_eq!(result[9], "syn09");
    }

    #[test]
    fn test_resolve_hashes_synonyms() {
        let resolver = ThesaurusResolver::from_entries(
            Language::German,
            [("Haus", Pos::Noun, vec!["Heim", "Gebäude"])],
        );
        let cache = SynonymCache::new(Arc::new(resolver));

        let ids = cache.resolve(&Token::new("Haus", Pos::Noun)).unwrap();
        assert_eq!(&*ids, &[hash_lemma("Gebäude"), hash_lemma("Heim")]);
    }

    #[test]
    fn test_resolve_memoizes() {
        let resolver = Arc::new(MockSynonymResolver::new(Language::English));
        resolver.insert("car", Pos::Noun, &["auto"]);
        let cache = SynonymCache::new(resolver.clone());

        let token = Token::new("car", Pos::Noun);
        cache.resolve(&token).unwrap();
        cache.resolve(&token).unwrap();
        cache.resolve(&token).unwrap();

        assert_eq!(resolver.lookups(), 1);
    }

    #[test]
    fn test_resolve_skips_non_content_words() {
        let resolver = Arc::new(MockSynonymResolver::new(Language::English));
        resolver.insert("the", Pos::Other, &["a"]);
        let cache = SynonymCache::new(resolver.clone());

        let ids = cache.resolve(&Token::new("the", Pos::Other)).unwrap();
        assert!(ids.is_empty());
        assert_eq!(resolver.lookups(), 0);
    }

    #[test]
    fn test_resolve_skips_german_adverbs() {
        let resolver = Arc::new(MockSynonymResolver::new(Language::German));
        resolver.insert("schnell", Pos::Adv, &["rasch"]);
        let cache = SynonymCache::new(resolver.clone());

        let ids = cache.resolve(&Token::new("schnell", Pos::Adv)).unwrap();
        assert!(ids.is_empty());
        assert_eq!(resolver.lookups(), 0);
    }

    #[test]
    fn test_resolve_propagates_resource_errors() {
        let resolver = Arc::new(MockSynonymResolver::new(Language::English));
        resolver.fail_with("connection refused");
        let cache = SynonymCache::new(resolver);

        let err = cache.resolve(&Token::new("car", Pos::Noun)).unwrap_err();
        assert!(matches!(err, SynonymError::Unavailable { .. }));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_same_lemma_different_pos_cached_separately() {
        let resolver = Arc::new(MockSynonymResolver::new(Language::English));
        resolver.insert("run", Pos::Noun, &["sprint"]);
        resolver.insert("run", Pos::Verb, &["race", "jog"]);
        let cache = SynonymCache::new(resolver);

        let noun = cache.resolve(&Token::new("run", Pos::Noun)).unwrap();
        let verb = cache.resolve(&Token::new("run", Pos::Verb)).unwrap();

        assert_eq!(noun.len(), 1);
        assert_eq!(verb.len(), 2);
    }
}
