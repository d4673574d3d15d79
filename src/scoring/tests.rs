use std::sync::Arc;

use proptest::prelude::*;

use super::*;
use crate::annotation::{Language, LexiconAnnotator, Pos, Token, lemma_ids};
use crate::hashing::hash_lemma;
use crate::ngram::DocumentNgrams;
use crate::synonyms::{MockSynonymResolver, SynonymCache, ThesaurusResolver};

fn tokens(words: &[&str]) -> Vec<Token> {
    words.iter().map(|w| Token::new(w, Pos::Other)).collect()
}

fn index(tokens: &[Token], max_n: usize) -> DocumentNgrams {
    DocumentNgrams::build(lemma_ids(tokens), max_n)
}

fn ids(words: &[&str]) -> Vec<u64> {
    words.iter().map(|w| hash_lemma(w)).collect()
}

fn modified_with(entries: Vec<(&'static str, Pos, Vec<&'static str>)>) -> ModifiedScorer {
    let resolver = ThesaurusResolver::from_entries(Language::English, entries);
    ModifiedScorer::new(5, SynonymCache::new(Arc::new(resolver)))
}

fn modified_plain() -> ModifiedScorer {
    modified_with(Vec::new())
}

#[test]
fn test_baseline_subsequence_scenario() {
    let source = index(&tokens(&["a", "b", "c", "d"]), 5);
    let candidate = index(&tokens(&["b", "c"]), 5);

    let scores = BaselineScorer::new(5).score(&source, &candidate);

    assert_eq!(scores.get("1"), Some(1.0));
    assert_eq!(scores.get("2"), Some(1.0));
    assert_eq!(scores.get("3"), Some(0.0));
    assert_eq!(scores.get("5"), Some(0.0));
    assert_eq!(scores.get("hapax"), Some(1.0));
}

#[test]
fn test_baseline_is_directional() {
    let long = index(&tokens(&["a", "b", "c", "d"]), 2);
    let short = index(&tokens(&["b", "c"]), 2);
    let scorer = BaselineScorer::new(2);

    let forward = scorer.score(&long, &short);
    let backward = scorer.score(&short, &long);

    assert_eq!(forward.get("1"), Some(1.0));
    assert_eq!(backward.get("1"), Some(0.5));
    assert_eq!(backward.get("2"), Some(1.0 / 3.0));
}

#[test]
fn test_baseline_ignores_repetition() {
    let source = index(&tokens(&["a", "b"]), 1);
    let candidate = index(&tokens(&["a", "a", "a", "z"]), 1);

    let scores = BaselineScorer::new(1).score(&source, &candidate);
    assert_eq!(scores.get("1"), Some(0.5));
    // hapax: candidate has only "z"
    assert_eq!(scores.get("hapax"), Some(0.0));
}

#[test]
fn test_baseline_key_order() {
    let doc = index(&tokens(&["a"]), 3);
    let scores = BaselineScorer::new(3).score(&doc, &doc);
    let keys: Vec<_> = scores.keys().collect();
    assert_eq!(keys, vec!["1", "2", "3", "hapax"]);
}

#[test]
fn test_empty_candidate_scores_zero() {
    let source = index(&tokens(&["a", "b", "c"]), 5);
    let empty = index(&[], 5);

    let baseline = BaselineScorer::new(5).score(&source, &empty);
    assert!(baseline.values().iter().all(|v| *v == 0.0));
    assert_eq!(baseline.len(), 6);

    let modified = modified_plain().score(&source, &[], &empty).unwrap();
    assert!(modified.values().iter().all(|v| *v == 0.0));
    assert_eq!(modified.len(), 5);
}

#[test]
fn test_empty_source_scores_zero() {
    let empty = index(&[], 5);
    let candidate_tokens = tokens(&["a", "b", "c"]);
    let candidate = index(&candidate_tokens, 5);

    let baseline = BaselineScorer::new(5).score(&empty, &candidate);
    assert!(baseline.values().iter().all(|v| *v == 0.0));

    let modified = modified_plain()
        .score(&empty, &candidate_tokens, &candidate)
        .unwrap();
    assert!(modified.values().iter().all(|v| *v == 0.0));
}

#[test]
fn test_skipgrams_interior_only() {
    let gram = ids(&["a", "b", "c", "d", "e"]);
    let skips: Vec<_> = skipgrams(&gram).collect();

    assert_eq!(skips.len(), 3);
    assert_eq!(&*skips[0], &ids(&["a", "c", "d", "e"])[..]);
    assert_eq!(&*skips[1], &ids(&["a", "b", "d", "e"])[..]);
    assert_eq!(&*skips[2], &ids(&["a", "b", "c", "e"])[..]);
}

#[test]
fn test_no_skipgrams_below_three() {
    assert_eq!(skipgrams(&ids(&["a", "b"])).count(), 0);
    assert_eq!(skipgrams(&ids(&["a"])).count(), 0);
    assert_eq!(skipgrams(&[]).count(), 0);
    assert_eq!(skipgrams(&ids(&["a", "b", "c"])).count(), 1);
}

#[test]
fn test_flatten_cartesian_product() {
    let slots = vec![
        Slot::Fixed(1),
        Slot::Alternatives(Arc::from(vec![2, 3])),
        Slot::Alternatives(Arc::from(vec![4, 5])),
    ];

    let flat = flatten(&slots);
    let flat: Vec<&[u64]> = flat.iter().map(|g| &**g).collect();

    assert_eq!(
        flat,
        vec![&[1, 2, 4][..], &[1, 2, 5][..], &[1, 3, 4][..], &[1, 3, 5][..]]
    );
}

#[test]
fn test_flatten_edge_cases() {
    assert!(flatten(&[]).is_empty());
    assert_eq!(flatten(&[Slot::Fixed(7)]).len(), 1);
    assert!(flatten(&[Slot::Fixed(7), Slot::Alternatives(Arc::from(Vec::new()))]).is_empty());
}

#[test]
fn test_non_content_words_stay_fixed() {
    let scorer = modified_with(vec![("the", Pos::Noun, vec!["a"])]);
    let gram = vec![Token::new("the", Pos::Other), Token::new("dog", Pos::Noun)];

    let slots = scorer.synonym_slots(&gram).unwrap();
    assert_eq!(slots[0], Slot::Fixed(hash_lemma("the")));
    assert_eq!(slots[1], Slot::Fixed(hash_lemma("dog")));
}

#[test]
fn test_expand_without_synonyms_duplicates_identity() {
    let scorer = modified_plain();
    let gram = tokens(&["a", "b", "c"]);

    let expansion = scorer.expand(&gram).unwrap();
    // identity, synonym variant (same tuple), one skip-gram of each
    assert_eq!(expansion.len(), 4);
    assert_eq!(expansion.variants()[0], expansion.variants()[1]);
    assert_eq!(&*expansion.variants()[2], &ids(&["a", "c"])[..]);
}

#[test]
fn test_expand_with_synonyms() {
    let scorer = modified_with(vec![
        ("big", Pos::Adj, vec!["large", "huge"]),
        ("house", Pos::Noun, vec!["home"]),
    ]);
    let gram = vec![
        Token::new("the", Pos::Other),
        Token::new("big", Pos::Adj),
        Token::new("house", Pos::Noun),
    ];

    let expansion = scorer.expand(&gram).unwrap();
    // identity + 2 synonym combinations, then one skip-gram per variant
    assert_eq!(expansion.len(), 6);
    assert!(
        expansion
            .variants()
            .iter()
            .any(|v| &**v == &ids(&["the", "huge", "home"])[..])
    );
    assert!(expansion.variants().iter().all(|v| v.len() == 3 || v.len() == 2));
}

#[test]
fn test_expected_count_sums_synonym_expansion() {
    let scorer = modified_with(vec![("w", Pos::Noun, vec!["x", "y"])]);
    let source = index(&tokens(&["x", "q", "x"]), 5);
    let candidate_tokens = vec![Token::new("w", Pos::Noun)];
    let candidate = index(&candidate_tokens, 5);

    let expansion = scorer.expand(&candidate_tokens).unwrap();
    assert_eq!(expansion.expected_count(&source), 2);

    // one occurrence of "w" in the candidate: min(2, 1) / 1
    let score = scorer
        .containment(&source, &candidate_tokens, &candidate, 1)
        .unwrap();
    assert_eq!(score, 1.0);
}

#[test]
fn test_modified_weights_by_candidate_frequency() {
    let scorer = modified_plain();
    let source = index(&tokens(&["a"]), 1);
    let candidate_tokens = tokens(&["a", "a", "b"]);
    let candidate = index(&candidate_tokens, 1);

    let score = scorer
        .containment(&source, &candidate_tokens, &candidate, 1)
        .unwrap();
    // "a": min(2, 2) twice, "b": min(0, 1)
    assert!((score - 0.8).abs() < 1e-12);

    let baseline = BaselineScorer::new(1).score(&source, &candidate);
    assert_eq!(baseline.get("1"), Some(0.5));
}

#[test]
fn test_modified_absorbs_word_substitution() {
    let scorer = modified_with(vec![("large", Pos::Adj, vec!["big"])]);
    let source = index(&tokens(&["the", "big", "house"]), 3);
    let candidate_tokens = vec![
        Token::new("the", Pos::Other),
        Token::new("large", Pos::Adj),
        Token::new("house", Pos::Other),
    ];
    let candidate = index(&candidate_tokens, 3);

    let trigram = scorer
        .containment(&source, &candidate_tokens, &candidate, 3)
        .unwrap();
    assert_eq!(trigram, 1.0);

    let baseline = BaselineScorer::new(3).score(&source, &candidate);
    assert_eq!(baseline.get("3"), Some(0.0));
}

#[test]
fn test_modified_absorbs_insertion() {
    let scorer = modified_plain();
    let source = index(&tokens(&["a", "c"]), 3);
    let candidate_tokens = tokens(&["a", "b", "c"]);
    let candidate = index(&candidate_tokens, 3);

    let trigram = scorer
        .containment(&source, &candidate_tokens, &candidate, 3)
        .unwrap();
    assert_eq!(trigram, 1.0);
}

#[test]
fn test_modified_no_shared_content() {
    let scorer = modified_with(vec![("cat", Pos::Noun, vec!["feline"])]);
    let source = index(&tokens(&["dog", "barks", "loudly"]), 5);
    let candidate_tokens = vec![
        Token::new("cat", Pos::Noun),
        Token::new("meows", Pos::Verb),
        Token::new("softly", Pos::Adv),
    ];
    let candidate = index(&candidate_tokens, 5);

    let scores = scorer
        .score(&source, &candidate_tokens, &candidate)
        .unwrap();
    assert!(scores.values().iter().all(|v| *v == 0.0));
}

#[test]
fn test_modified_key_order() {
    let doc_tokens = tokens(&["a", "b"]);
    let doc = index(&doc_tokens, 5);
    let scores = modified_plain().score(&doc, &doc_tokens, &doc).unwrap();
    let keys: Vec<_> = scores.keys().collect();
    assert_eq!(keys, vec!["1_mod", "2_mod", "3_mod", "4_mod", "5_mod"]);
}

#[test]
fn test_modified_rejects_mismatched_index() {
    let doc_tokens = tokens(&["a", "b"]);
    let other = index(&tokens(&["a"]), 5);
    let err = modified_plain()
        .score(&other, &doc_tokens, &other)
        .unwrap_err();
    assert!(matches!(err, ScoringError::InvalidInput { .. }));
}

#[test]
fn test_modified_propagates_resource_failure() {
    let resolver = Arc::new(MockSynonymResolver::new(Language::English));
    resolver.fail_with("service down");
    let scorer = ModifiedScorer::new(2, SynonymCache::new(resolver));

    let candidate_tokens = vec![Token::new("car", Pos::Noun)];
    let candidate = index(&candidate_tokens, 2);
    let err = scorer
        .score(&candidate, &candidate_tokens, &candidate)
        .unwrap_err();
    assert!(matches!(err, ScoringError::Synonym(_)));
}

#[test]
fn test_score_vector_json_preserves_order() {
    let mut scores = ScoreVector::new();
    scores.insert("2", 0.5);
    scores.insert("1", 1.0);
    scores.insert("hapax", 0.25);
    scores.insert("1", 0.75);

    let json = scores.to_json().unwrap();
    assert_eq!(json, r#"{"2":0.5,"1":0.75,"hapax":0.25}"#);

    let parsed = ScoreVector::from_json(&json).unwrap();
    assert_eq!(parsed, scores);
    assert_eq!(parsed.values(), vec![0.5, 0.75, 0.25]);
}

#[test]
fn test_feature_keys() {
    assert_eq!(feature_keys(2, false), vec!["1", "2", "hapax"]);
    assert_eq!(
        feature_keys(2, true),
        vec!["1", "2", "hapax", "1_mod", "2_mod"]
    );
    assert_eq!(containment_ratio(3, 0), 0.0);
}

fn pair_scorer(use_modified: bool) -> PairScorer {
    let annotator = Arc::new(LexiconAnnotator::from_entries(
        Language::English,
        [("large", "large", Pos::Adj)],
    ));
    let modified = use_modified.then(|| {
        let resolver = ThesaurusResolver::from_entries(
            Language::English,
            [("large", Pos::Adj, vec!["big"])],
        );
        ModifiedScorer::new(3, SynonymCache::new(Arc::new(resolver)))
    });
    PairScorer::new(
        annotator,
        DocumentCache::new(3),
        BaselineScorer::new(3),
        modified,
    )
    .unwrap()
}

#[test]
fn test_pair_scorer_feature_order_matches_output() {
    let scorer = pair_scorer(true);
    let scores = scorer
        .score_texts("The big house.", "The large house!")
        .unwrap();

    let keys: Vec<String> = scores.keys().map(str::to_string).collect();
    assert_eq!(keys, scorer.feature_keys());
    assert_eq!(scores.get("3"), Some(0.0));
    assert_eq!(scores.get("3_mod"), Some(1.0));
}

#[test]
fn test_pair_scorer_caches_documents() {
    let scorer = pair_scorer(false);
    let source = DocumentKey::source("s1");
    let candidate = DocumentKey::candidate("s1");

    scorer
        .score_pair((&source, "one two three"), (&candidate, "two three"))
        .unwrap();
    scorer.documents().run_pending_tasks();

    assert!(scorer.documents().contains(&source));
    assert!(scorer.documents().contains(&candidate));
    assert_eq!(scorer.documents().len(), 2);

    scorer.documents().invalidate(&source);
    scorer.documents().run_pending_tasks();
    assert!(!scorer.documents().contains(&source));
}

#[test]
fn test_pair_scorer_rejects_short_document_index() {
    let annotator = Arc::new(LexiconAnnotator::new(Language::English));
    let err = PairScorer::new(annotator, DocumentCache::new(2), BaselineScorer::new(3), None)
        .unwrap_err();
    assert!(matches!(err, ScoringError::InvalidInput { .. }));
}

fn sequence() -> impl Strategy<Value = Vec<Token>> {
    prop::collection::vec(
        (0u8..6, prop::sample::select(vec![Pos::Noun, Pos::Verb, Pos::Other])),
        0..24,
    )
    .prop_map(|items| {
        items
            .into_iter()
            .map(|(w, pos)| Token::new(&format!("w{}", w), pos))
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_scores_within_unit_interval(source in sequence(), candidate in sequence()) {
        let scorer = modified_with(vec![
            ("w0", Pos::Noun, vec!["w1", "w2"]),
            ("w3", Pos::Verb, vec!["w4"]),
        ]);
        let source_index = index(&source, 5);
        let candidate_index = index(&candidate, 5);

        let baseline = BaselineScorer::new(5).score(&source_index, &candidate_index);
        let modified = scorer.score(&source_index, &candidate, &candidate_index).unwrap();

        for value in baseline.values().into_iter().chain(modified.values()) {
            prop_assert!((0.0..=1.0).contains(&value));
        }
    }

    #[test]
    fn prop_lengths_beyond_candidate_score_zero(source in sequence(), candidate in sequence()) {
        let source_index = index(&source, 5);
        let candidate_index = index(&candidate, 5);
        let baseline = BaselineScorer::new(5).score(&source_index, &candidate_index);

        for n in (candidate.len() + 1)..=5 {
            prop_assert_eq!(baseline.get(&n.to_string()), Some(0.0));
        }
    }

    #[test]
    fn prop_self_containment_is_total(words in sequence()) {
        prop_assume!(!words.is_empty());
        let doc = index(&words, 5);
        let baseline = BaselineScorer::new(5).score(&doc, &doc);
        prop_assert_eq!(baseline.get("1"), Some(1.0));
    }
}
