//! Spam → ham rewriting: walk the paraphrase layers in order and keep the
//! first one the classifier scores as ham.

use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use serde::Serialize;
use tracing::debug;

use crate::classifier::{Classification, SpamClassifier};
use crate::corpus::{tokenize, Label};
use crate::logging::anon_hash;
use crate::metrics::ensure_metrics_described;
use crate::paraphrase::ParaphraseGenerator;

/// Outcome of one rewrite. On failure `output` is the untouched input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rewrite {
    pub output: String,
    pub succeeded: bool,
    /// Layer index of the accepted variant.
    pub layer: Option<usize>,
    pub variants_tried: usize,
}

#[derive(Debug, Clone)]
pub struct AdversarialRewriter {
    classifier: Arc<SpamClassifier>,
    generator: ParaphraseGenerator,
    default_max_variants: Option<usize>,
}

impl AdversarialRewriter {
    pub fn new(classifier: Arc<SpamClassifier>, generator: ParaphraseGenerator) -> Self {
        Self {
            classifier,
            generator,
            default_max_variants: None,
        }
    }

    /// Layer budget used when a caller passes `None`. When unset, the
    /// message's longest synonym list decides.
    pub fn with_default_max_variants(mut self, max_variants: Option<usize>) -> Self {
        self.default_max_variants = max_variants;
        self
    }

    pub fn classifier(&self) -> &SpamClassifier {
        &self.classifier
    }

    pub fn generator(&self) -> &ParaphraseGenerator {
        &self.generator
    }

    pub fn default_max_variants(&self) -> Option<usize> {
        self.default_max_variants
    }

    pub fn classify_text(&self, text: &str) -> Classification {
        self.classifier.classify_text(text)
    }

    /// Try each variant of `text` in layer order and return the first one
    /// classified as ham. Never returns a partially substituted message.
    pub fn rewrite(&self, text: &str, max_variants: Option<usize>) -> Rewrite {
        ensure_metrics_described();
        counter!("rewrite_requests_total").increment(1);
        let started = Instant::now();

        let budget = max_variants.or(self.default_max_variants);
        let mut tried = 0usize;
        let mut accepted: Option<(usize, String)> = None;

        for (layer, variant) in self.generator.expand(text, budget).enumerate() {
            tried += 1;
            let verdict = self.classifier.classify(&tokenize(&variant));
            if verdict.label == Label::Ham {
                accepted = Some((layer, variant));
                break;
            }
        }

        counter!("rewrite_variants_scored_total").increment(tried as u64);
        histogram!("rewrite_duration_ms").record(started.elapsed().as_secs_f64() * 1000.0);

        let id = anon_hash(text);
        match accepted {
            Some((layer, output)) => {
                counter!("rewrite_success_total").increment(1);
                debug!(target: "rewrite", %id, layer, tried, "variant accepted as ham");
                Rewrite {
                    output,
                    succeeded: true,
                    layer: Some(layer),
                    variants_tried: tried,
                }
            }
            None => {
                debug!(target: "rewrite", %id, tried, "no variant escaped the filter");
                Rewrite {
                    output: text.to_string(),
                    succeeded: false,
                    layer: None,
                    variants_tried: tried,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Corpus;
    use std::collections::HashMap;
    use std::thread;

    fn classifier() -> Arc<SpamClassifier> {
        let corpus = Corpus::from_labeled_texts([
            (Label::Spam, "free offer win cash"),
            (Label::Spam, "free cash prize"),
            (Label::Ham, "meeting update gratis lunch"),
            (Label::Ham, "project update tomorrow"),
        ])
        .unwrap();
        Arc::new(SpamClassifier::new(&corpus).unwrap())
    }

    fn lexicon() -> HashMap<String, Vec<String>> {
        HashMap::from([
            (
                "free".to_string(),
                vec!["free".to_string(), "gratis".to_string()],
            ),
            ("cash".to_string(), vec!["money".to_string()]),
        ])
    }

    fn rewriter() -> AdversarialRewriter {
        AdversarialRewriter::new(classifier(), ParaphraseGenerator::new(lexicon()))
    }

    #[test]
    fn returns_first_ham_layer() {
        let r = rewriter();
        assert!(r.classify_text("free cash").is_spam());

        let out = r.rewrite("free cash", None);
        assert!(out.succeeded);
        assert_eq!(out.layer, Some(1));
        assert_eq!(out.output, "gratis money");
        assert_eq!(out.variants_tried, 2);
        assert!(!r.classify_text(&out.output).is_spam());
    }

    #[test]
    fn agrees_with_direct_classification_of_each_layer() {
        let r = rewriter();
        let text = "free offer free cash";
        let variants: Vec<String> = r.generator().expand(text, Some(3)).collect();
        let first_ham = variants
            .iter()
            .position(|v| r.classify_text(v).label == Label::Ham);

        let out = r.rewrite(text, Some(3));
        match first_ham {
            Some(i) => {
                assert!(out.succeeded);
                assert_eq!(out.layer, Some(i));
                assert_eq!(out.output, variants[i]);
            }
            None => {
                assert!(!out.succeeded);
                assert_eq!(out.output, text);
            }
        }
    }

    #[test]
    fn zero_variants_fail_with_original() {
        let r = rewriter();
        let out = r.rewrite("free cash", Some(0));
        assert_eq!(
            out,
            Rewrite {
                output: "free cash".into(),
                succeeded: false,
                layer: None,
                variants_tried: 0
            }
        );
        assert!(!r.rewrite("", None).succeeded);
    }

    #[test]
    fn spam_without_synonyms_fails() {
        let r = AdversarialRewriter::new(
            classifier(),
            ParaphraseGenerator::new(HashMap::<String, Vec<String>>::new()),
        );
        assert!(r.classify_text("win prize").is_spam());
        let out = r.rewrite("win  prize", Some(4));
        assert!(!out.succeeded);
        assert_eq!(out.output, "win  prize");
        assert_eq!(out.variants_tried, 4);
    }

    #[test]
    fn ham_input_succeeds_on_first_layer() {
        let r = rewriter();
        let out = r.rewrite("meeting update", Some(2));
        assert!(out.succeeded);
        assert_eq!(out.layer, Some(0));
        assert_eq!(out.output, "meeting update");
    }

    #[test]
    fn configured_default_budget_applies() {
        let r = rewriter().with_default_max_variants(Some(1));
        let out = r.rewrite("free cash", None);
        assert!(!out.succeeded);
        assert_eq!(out.variants_tried, 1);

        // explicit argument wins over the configured default
        assert!(r.rewrite("free cash", Some(2)).succeeded);
    }

    #[test]
    fn concurrent_rewrites_agree() {
        let r = Arc::new(rewriter());
        let expected = r.rewrite("free cash", None);
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let r = Arc::clone(&r);
                thread::spawn(move || r.rewrite("free cash", None))
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), expected);
        }
    }
}
