// tests/scenarios.rs
//
// End-to-end behaviour of the filter + paraphraser + rewriter through the
// public crate API only.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::sync::Arc;

use dnasb_transformer::{
    corpus::tokenize, AdversarialRewriter, Corpus, CorpusRow, Label, ParaphraseGenerator,
    SpamClassifier, Thesaurus,
};

fn row(label: Label, text: &str) -> CorpusRow {
    let mut counts = HashMap::new();
    for w in text.split_whitespace() {
        *counts.entry(w.to_string()).or_insert(0) += 1;
    }
    CorpusRow {
        label,
        text: text.to_string(),
        counts,
    }
}

/// Vocabulary {free, offer, meeting, update}; spam rows say "free offer",
/// ham rows say "meeting update".
fn classifier_a() -> Arc<SpamClassifier> {
    let corpus = Corpus::new(
        ["free", "offer", "meeting", "update"],
        vec![
            row(Label::Spam, "free offer"),
            row(Label::Spam, "offer free"),
            row(Label::Ham, "meeting update"),
            row(Label::Ham, "update meeting"),
        ],
    )
    .expect("valid corpus");
    Arc::new(SpamClassifier::new(&corpus).expect("trainable"))
}

fn free_lexicon() -> HashMap<String, Vec<String>> {
    HashMap::from([(
        "free".to_string(),
        vec!["complimentary".to_string(), "gratis".to_string()],
    )])
}

#[test]
fn scenario_a_classifies_both_classes() {
    let c = classifier_a();
    assert_eq!(c.classify(&["free", "offer"]).label, Label::Spam);
    assert_eq!(c.classify(&["meeting", "update"]).label, Label::Ham);
    let p = c.priors();
    assert!((p.spam + p.ham - 1.0).abs() < 1e-12);
}

#[test]
fn scenario_b_expands_in_sense_order() {
    let c = classifier_a();
    assert!(c.word_likelihood("stuff").is_none());

    let g = ParaphraseGenerator::new(free_lexicon());
    let variants: Vec<String> = g.expand("free stuff", Some(2)).collect();
    assert_eq!(variants, vec!["complimentary stuff", "gratis stuff"]);

    let r = AdversarialRewriter::new(c, g);
    assert!(r.classify_text("free stuff").is_spam());
    let out = r.rewrite("free stuff", Some(2));
    assert!(out.succeeded);
    assert_eq!(out.output, "complimentary stuff");
}

#[test]
fn scenario_c_without_synonyms_spam_stays_spam() {
    let g = ParaphraseGenerator::new(HashMap::<String, Vec<String>>::new());
    let variants: Vec<String> = g.expand("free offer", Some(3)).collect();
    assert_eq!(variants, vec!["free offer"; 3]);

    let r = AdversarialRewriter::new(classifier_a(), g);
    assert!(r.classify_text("free offer").is_spam());
    let out = r.rewrite("free offer", Some(3));
    assert!(!out.succeeded);
    assert_eq!(out.output, "free offer");
    assert_eq!(out.variants_tried, 3);
}

#[test]
fn variants_never_change_token_count() {
    let thesaurus = Thesaurus::builtin().unwrap();
    let g = ParaphraseGenerator::new(thesaurus);
    let text = "urgent claim your free cash prize call now";
    let n = tokenize(text).len();
    let variants: Vec<String> = g.expand(text, None).collect();
    assert!(!variants.is_empty());
    for v in &variants {
        assert_eq!(tokenize(v).len(), n, "variant {v:?}");
    }
    // default count is the longest candidate list in the message
    let distinct: HashSet<&str> = tokenize(text).into_iter().collect();
    let longest = distinct
        .iter()
        .map(|t| dnasb_transformer::LexicalResource::synonyms(g.lexicon(), t).len())
        .max()
        .unwrap();
    assert_eq!(variants.len(), longest);
}

#[test]
fn rewrite_matches_layerwise_oracle() {
    let corpus = Corpus::load(concat!(env!("CARGO_MANIFEST_DIR"), "/data/corpus.json")).unwrap();
    let c = Arc::new(SpamClassifier::new(&corpus).unwrap());
    let g = ParaphraseGenerator::new(Thesaurus::builtin().unwrap());
    let r = AdversarialRewriter::new(c.clone(), g.clone());

    for text in [
        "win free cash now",
        "urgent claim your prize call now",
        "see you at the meeting tomorrow",
        "FREE AVOCADOS",
    ] {
        let layers: Vec<String> = g.expand(text, Some(5)).collect();
        let expected = layers
            .iter()
            .position(|v| c.classify_text(v).label == Label::Ham);
        let out = r.rewrite(text, Some(5));
        assert_eq!(out.layer, expected, "text {text:?}");
        match expected {
            Some(i) => assert_eq!(out.output, layers[i]),
            None => assert_eq!(out.output, text),
        }
        assert!(!out.output.is_empty());
    }
}

#[test]
fn thesaurus_file_drives_the_generator() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("thesaurus.toml");
    fs::write(
        &p,
        r#"
[synonyms]
offer = ["proposal", "deal"]
free = ["gratis"]
"#,
    )
    .unwrap();
    let g = ParaphraseGenerator::new(Thesaurus::load(&p).unwrap());
    let variants: Vec<String> = g.expand("free offer", None).collect();
    assert_eq!(variants, vec!["gratis proposal", "gratis deal"]);
}

#[test]
fn corpus_errors_surface_at_construction() {
    let only_spam = Corpus::new(["free"], vec![row(Label::Spam, "free")]);
    assert!(matches!(
        only_spam,
        Err(dnasb_transformer::ModelError::MissingLabel(Label::Ham))
    ));
    assert!(Corpus::from_json_str(r#"{"vocabulary": [], "rows": []}"#).is_err());
}
