//! Builders for input databases, classifier artifacts and pipelines.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rusqlite::{Connection, params};
use textreuse::annotation::{Language, LexiconAnnotator, Pos};
use textreuse::classifier::{Classifier, LinearClassifier};
use textreuse::pipeline::{PairScoringPipeline, PipelineSettings};
use textreuse::synonyms::{SynonymResolver, ThesaurusResolver};

/// Builds an input database with `sources` and `texts` tables.
pub struct InputDbBuilder {
    path: PathBuf,
    sources: Vec<(Option<String>, Option<String>, Option<String>)>,
    candidates: Vec<(Option<String>, Option<String>, Option<String>)>,
}

impl InputDbBuilder {
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join("input.db"),
            sources: Vec::new(),
            candidates: Vec::new(),
        }
    }

    pub fn source(mut self, id: &str, text: &str) -> Self {
        self.sources
            .push((Some(id.to_string()), Some(text.to_string()), Some("de".to_string())));
        self
    }

    pub fn candidate(mut self, id: &str, text: &str) -> Self {
        self.candidates
            .push((Some(id.to_string()), Some(text.to_string()), Some("de".to_string())));
        self
    }

    pub fn raw_candidate(mut self, id: &str, text: Option<&str>, language: Option<&str>) -> Self {
        self.candidates.push((
            Some(id.to_string()),
            text.map(str::to_string),
            language.map(str::to_string),
        ));
        self
    }

    pub fn build(self) -> PathBuf {
        let conn = Connection::open(&self.path).unwrap();
        conn.execute_batch(
            "CREATE TABLE sources (
                id TEXT PRIMARY KEY, publication TEXT, language TEXT, date TEXT,
                author TEXT, url TEXT, text TEXT
             );
             CREATE TABLE texts (
                id TEXT PRIMARY KEY, publication TEXT, language TEXT, date TEXT,
                author TEXT, url TEXT, text TEXT
             );",
        )
        .unwrap();

        for (table, rows) in [("sources", &self.sources), ("texts", &self.candidates)] {
            for (id, text, language) in rows {
                conn.execute(
                    &format!(
                        "INSERT INTO {} (id, language, text) VALUES (?1, ?2, ?3)",
                        table
                    ),
                    params![id, language, text],
                )
                .unwrap();
            }
        }
        self.path
    }
}

/// Two sources and three candidates, six rows in total.
pub fn small_corpus(dir: &Path) -> PathBuf {
    InputDbBuilder::new(dir)
        .source("s1", "der alte Mann geht langsam nach Hause")
        .source("s2", "die Sonne scheint hell über dem Meer")
        .candidate("t1", "der alte Mann geht nach Hause")
        .candidate("t2", "die Sonne scheint über dem Meer")
        .candidate("t3", "ganz anderer Inhalt ohne Bezug")
        .build()
}

/// Binary classifier labeling a pair "related" when the unigram score exceeds 0.5.
pub fn classifier(features: &[String]) -> LinearClassifier {
    let mut weights = vec![0.0; features.len()];
    weights[0] = 1.0;
    let model = serde_json::json!({
        "features": features,
        "classes": ["unrelated", "related"],
        "coefficients": [weights],
        "intercepts": [-0.5],
    });
    LinearClassifier::from_json(&model.to_string()).unwrap()
}

pub fn write_classifier(dir: &Path, features: &[String]) -> PathBuf {
    let path = dir.join("model.json");
    std::fs::write(&path, serde_json::to_string(classifier(features).model()).unwrap()).unwrap();
    path
}

pub fn settings(workers: usize, bundle_size: usize) -> PipelineSettings {
    PipelineSettings {
        language: Language::German,
        workers,
        bundle_size,
        page_size: 2,
        ..PipelineSettings::default()
    }
}

pub fn annotator() -> Arc<LexiconAnnotator> {
    Arc::new(LexiconAnnotator::from_entries(
        Language::German,
        [
            ("großes", "groß", Pos::Adj),
            ("riesiges", "riesig", Pos::Adj),
            ("haus", "haus", Pos::Noun),
            ("steht", "stehen", Pos::Verb),
        ],
    ))
}

pub fn thesaurus() -> Arc<ThesaurusResolver> {
    Arc::new(ThesaurusResolver::from_entries(
        Language::German,
        [("riesig", Pos::Adj, vec!["groß", "gewaltig"])],
    ))
}

pub fn pipeline(settings: PipelineSettings, classifier: Arc<dyn Classifier>) -> PairScoringPipeline {
    let synonyms: Option<Arc<dyn SynonymResolver>> = if settings.use_modified {
        Some(thesaurus())
    } else {
        None
    };
    PairScoringPipeline::new(settings, annotator(), synonyms, classifier).unwrap()
}
