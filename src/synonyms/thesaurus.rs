use std::collections::HashMap;
use std::path::Path;

use tracing::info;

use crate::annotation::{Language, Pos};

use super::SynonymResolver;
use super::error::SynonymError;

/// Sense inventory loaded from a `lemma<TAB>category<TAB>syn|syn|...` file.
///
/// `category` is the resource-native word category of the configured language (see
/// [`Language::lexical_category`]): `nomen`, `verben`, `adj` for German, `n`, `v`, `a`, `r`
/// for English. Several lines for the same `(lemma, category)` accumulate.
#[derive(Debug, Clone)]
pub struct ThesaurusResolver {
    language: Language,
    entries: HashMap<(String, String), Vec<String>>,
}

impl ThesaurusResolver {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            entries: HashMap::new(),
        }
    }

    /// Builds a resolver from in-memory `(lemma, pos, synonyms)` entries.
    ///
    /// Entries whose part of speech has no category in `language` are dropped.
    pub fn from_entries<'a, I>(language: Language, entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Pos, Vec<&'a str>)>,
    {
        let mut resolver = Self::new(language);
        for (lemma, pos, synonyms) in entries {
            if let Some(category) = language.lexical_category(pos) {
                resolver
                    .entries
                    .entry((lemma.to_string(), category.to_string()))
                    .or_default()
                    .extend(synonyms.into_iter().map(str::to_string));
            }
        }
        resolver
    }

    pub fn load(path: &Path, language: Language) -> Result<Self, SynonymError> {
        if !path.exists() {
            return Err(SynonymError::ResourceNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        let mut resolver = Self::new(language);

        for (idx, line) in content.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() != 3 {
                return Err(SynonymError::MalformedResource {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    reason: format!("expected 3 tab-separated fields, got {}", fields.len()),
                });
            }

            let synonyms = fields[2]
                .split('|')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string);

            resolver
                .entries
                .entry((fields[0].to_string(), fields[1].trim().to_lowercase()))
                .or_default()
                .extend(synonyms);
        }

        info!(
            path = %path.display(),
            language = %language,
            entries = resolver.entries.len(),
            "Loaded lexical resource"
        );

        Ok(resolver)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SynonymResolver for ThesaurusResolver {
    fn language(&self) -> Language {
        self.language
    }

    fn lookup(&self, lemma: &str, pos: Pos) -> Result<Vec<String>, SynonymError> {
        let Some(category) = self.language.lexical_category(pos) else {
            return Ok(Vec::new());
        };

        Ok(self
            .entries
            .get(&(lemma.to_string(), category.to_string()))
            .cloned()
            .unwrap_or_default())
    }
}
