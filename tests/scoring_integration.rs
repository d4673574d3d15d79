//! Integration tests for text-level scoring with file-backed lexical resources.

use std::sync::Arc;

use textreuse::annotation::{Language, LexiconAnnotator};
use textreuse::scoring::{BaselineScorer, DocumentCache, ModifiedScorer, PairScorer};
use textreuse::synonyms::{SynonymCache, ThesaurusResolver};

fn write(dir: &std::path::Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn scorer(dir: &std::path::Path) -> PairScorer {
    let lexicon = write(
        dir,
        "lexicon.tsv",
        "# form\tlemma\tpos\n\
         cars\tcar\tNOUN\n\
         automobiles\tautomobile\tNOUN\n\
         drove\tdrive\tVERB\n\
         quickly\tquickly\tADV\n",
    );
    let thesaurus = write(
        dir,
        "thesaurus.tsv",
        "automobile\tn\tcar|auto|motor_vehicle\n\
         quickly\tr\tfast|rapidly\n",
    );

    let annotator = LexiconAnnotator::load(&lexicon, Language::English).unwrap();
    let resolver = ThesaurusResolver::load(&thesaurus, Language::English).unwrap();

    PairScorer::new(
        Arc::new(annotator),
        DocumentCache::new(3),
        BaselineScorer::new(3),
        Some(ModifiedScorer::new(3, SynonymCache::new(Arc::new(resolver)))),
    )
    .unwrap()
}

#[test]
fn test_lemmatized_overlap() {
    let dir = tempfile::tempdir().unwrap();
    let scorer = scorer(dir.path());

    let scores = scorer
        .score_texts("The cars drove quickly", "the cars drove away")
        .unwrap();

    assert_eq!(scores.get("1"), Some(0.75));
    assert_eq!(scores.get("2"), Some(2.0 / 3.0));
    assert_eq!(scores.get("3"), Some(0.5));
}

#[test]
fn test_synonym_substitution_lifts_modified_score() {
    let dir = tempfile::tempdir().unwrap();
    let scorer = scorer(dir.path());

    let scores = scorer
        .score_texts("many cars drove", "many automobiles drove")
        .unwrap();

    assert_eq!(scores.get("2"), Some(0.0));
    assert_eq!(scores.get("3"), Some(0.0));
    assert_eq!(scores.get("2_mod"), Some(1.0));
    assert_eq!(scores.get("3_mod"), Some(1.0));
}

#[test]
fn test_unrelated_texts_score_zero() {
    let dir = tempfile::tempdir().unwrap();
    let scorer = scorer(dir.path());

    let scores = scorer.score_texts("cars drove", "birds sing").unwrap();
    assert!(scores.values().iter().all(|v| *v == 0.0));
}

#[test]
fn test_empty_texts() {
    let dir = tempfile::tempdir().unwrap();
    let scorer = scorer(dir.path());

    let scores = scorer.score_texts("cars drove", "").unwrap();
    assert_eq!(scores.len(), 7);
    assert!(scores.values().iter().all(|v| *v == 0.0));

    let scores = scorer.score_texts("", "cars drove").unwrap();
    assert!(scores.values().iter().all(|v| *v == 0.0));
}
