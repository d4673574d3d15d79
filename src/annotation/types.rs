use std::sync::Arc;

use crate::hashing::{LemmaId, hash_lemma};

use super::error::AnnotationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Coarse part-of-speech category.
pub enum Pos {
    Noun,
    Verb,
    Adj,
    Adv,
    /// Anything else (determiners, punctuation, proper nouns, ...).
    Other,
}

impl Pos {
    /// Returns `true` for the open-class categories eligible for synonym substitution.
    #[inline]
    pub fn is_content_word(&self) -> bool {
        !matches!(self, Pos::Other)
    }

    #[inline]
    pub fn as_tag(&self) -> &'static str {
        match self {
            Pos::Noun => "NOUN",
            Pos::Verb => "VERB",
            Pos::Adj => "ADJ",
            Pos::Adv => "ADV",
            Pos::Other => "OTHER",
        }
    }

    /// Parses a Universal Dependencies style tag; unknown tags map to [`Pos::Other`].
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_uppercase().as_str() {
            "NOUN" => Pos::Noun,
            "VERB" => Pos::Verb,
            "ADJ" => Pos::Adj,
            "ADV" => Pos::Adv,
            _ => Pos::Other,
        }
    }
}

impl std::fmt::Display for Pos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_tag())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
/// Text language supported by the annotation and lexical resources.
pub enum Language {
    #[default]
    German,
    English,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::German => "de",
            Language::English => "en",
        }
    }

    /// Maps a part of speech to the lexical resource's word category.
    ///
    /// Returns `None` when the resource has no category for it, in which case the token
    /// never expands. GermaNet has no adverb category.
    pub fn lexical_category(&self, pos: Pos) -> Option<&'static str> {
        match (self, pos) {
            (Language::English, Pos::Noun) => Some("n"),
            (Language::English, Pos::Verb) => Some("v"),
            (Language::English, Pos::Adj) => Some("a"),
            (Language::English, Pos::Adv) => Some("r"),
            (Language::German, Pos::Noun) => Some("nomen"),
            (Language::German, Pos::Verb) => Some("verben"),
            (Language::German, Pos::Adj) => Some("adj"),
            (Language::German, Pos::Adv) | (_, Pos::Other) => None,
        }
    }
}

impl std::str::FromStr for Language {
    type Err = AnnotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "de" | "german" | "deu" => Ok(Self::German),
            "en" | "english" | "eng" => Ok(Self::English),
            _ => Err(AnnotationError::UnsupportedLanguage {
                language: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// One annotated token. Immutable once produced.
pub struct Token {
    lemma: Arc<str>,
    lemma_id: LemmaId,
    pos: Pos,
}

impl Token {
    pub fn new(lemma: &str, pos: Pos) -> Self {
        Self {
            lemma: Arc::from(lemma),
            lemma_id: hash_lemma(lemma),
            pos,
        }
    }

    #[inline]
    pub fn lemma(&self) -> &str {
        &self.lemma
    }

    /// Returns the lemma as a shared string (cheap to clone into cache keys).
    #[inline]
    pub fn shared_lemma(&self) -> Arc<str> {
        Arc::clone(&self.lemma)
    }

    #[inline]
    pub fn lemma_id(&self) -> LemmaId {
        self.lemma_id
    }

    #[inline]
    pub fn pos(&self) -> Pos {
        self.pos
    }
}

/// Projects a token sequence onto its lemma identifiers.
pub fn lemma_ids(tokens: &[Token]) -> Vec<LemmaId> {
    tokens.iter().map(Token::lemma_id).collect()
}
