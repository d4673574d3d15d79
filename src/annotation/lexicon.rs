use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info};

use super::Annotator;
use super::error::AnnotationError;
use super::types::{Language, Pos, Token};

fn is_joiner(c: char) -> bool {
    matches!(c, '\'' | '\u{2019}' | '-' | '\u{2010}')
}

/// Splits `text` into words: maximal runs of alphanumeric characters, where a single apostrophe
/// or hyphen between two alphanumerics stays inside the word (`don't`, `E-Mail`).
pub fn words(text: &str) -> Vec<&str> {
    let mut words = Vec::new();
    let mut start: Option<usize> = None;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c.is_alphanumeric() {
            start.get_or_insert(i);
            continue;
        }

        let joins = is_joiner(c)
            && start.is_some()
            && chars.peek().is_some_and(|&(_, next)| next.is_alphanumeric());
        if joins {
            continue;
        }

        if let Some(s) = start.take() {
            words.push(&text[s..i]);
        }
    }

    if let Some(s) = start {
        words.push(&text[s..]);
    }
    words
}

/// Dictionary-backed annotator.
///
/// Splits text into [`words`], lowercases each word form and looks it up in a
/// `form<TAB>lemma<TAB>POS` lexicon. Forms missing from the lexicon become their own lemma with
/// [`Pos::Other`], so they take part in n-gram matching but never expand to synonyms.
#[derive(Debug, Clone, Default)]
pub struct LexiconAnnotator {
    language: Language,
    entries: HashMap<String, (String, Pos)>,
}

impl LexiconAnnotator {
    /// Creates an annotator with an empty lexicon.
    pub fn new(language: Language) -> Self {
        Self {
            language,
            entries: HashMap::new(),
        }
    }

    /// Builds an annotator from in-memory `(form, lemma, pos)` entries.
    pub fn from_entries<'a, I>(language: Language, entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str, Pos)>,
    {
        let entries = entries
            .into_iter()
            .map(|(form, lemma, pos)| (form.to_lowercase(), (lemma.to_string(), pos)))
            .collect();
        Self { language, entries }
    }

    /// Loads a tab-separated lexicon file. Blank lines and `#` comments are ignored.
    pub fn load(path: &Path, language: Language) -> Result<Self, AnnotationError> {
        if !path.exists() {
            return Err(AnnotationError::LexiconNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        let mut entries = HashMap::new();

        for (idx, line) in content.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            let mut fields = line.split('\t');
            let (Some(form), Some(lemma), Some(tag)) = (fields.next(), fields.next(), fields.next())
            else {
                return Err(AnnotationError::MalformedLexicon {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    reason: "expected 3 tab-separated fields".to_string(),
                });
            };

            if form.is_empty() || lemma.is_empty() {
                return Err(AnnotationError::MalformedLexicon {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    reason: "empty form or lemma".to_string(),
                });
            }

            entries.insert(form.to_lowercase(), (lemma.to_string(), Pos::from_tag(tag)));
        }

        info!(
            path = %path.display(),
            language = %language,
            entries = entries.len(),
            "Loaded annotation lexicon"
        );

        Ok(Self { language, entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn annotate_word(&self, word: &str) -> Token {
        let form = word.to_lowercase();
        match self.entries.get(&form) {
            Some((lemma, pos)) => Token::new(lemma, *pos),
            None => Token::new(&form, Pos::Other),
        }
    }
}

impl Annotator for LexiconAnnotator {
    fn language(&self) -> Language {
        self.language
    }

    fn annotate(&self, text: &str) -> Result<Vec<Token>, AnnotationError> {
        let tokens: Vec<Token> = words(text)
            .into_iter()
            .map(|w| self.annotate_word(w))
            .collect();

        debug!(
            text_len = text.len(),
            tokens = tokens.len(),
            "Annotated text"
        );

        Ok(tokens)
    }
}
