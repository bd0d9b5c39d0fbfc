//! Naive-Bayes spam filter over whitespace tokens.
//!
//! Per-word likelihoods use add-alpha smoothing:
//! `P(w | class) = (count(w, class) + alpha) / (total(class) + alpha * V)`.
//! Out-of-vocabulary tokens contribute a factor of 1.
//!
//! Scores are accumulated in log space so long messages do not underflow.
//! The decision (spam iff spam score is strictly greater) is the same as
//! with the plain product.

use std::collections::HashMap;

use serde::Serialize;

use crate::corpus::{tokenize, ClassTotals, Corpus, Label};
use crate::error::{ModelError, Result};

/// Laplace add-one smoothing.
pub const DEFAULT_ALPHA: f64 = 1.0;

/// Relative row frequency of each class. `spam + ham == 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassPriors {
    pub spam: f64,
    pub ham: f64,
}

/// Smoothed conditional probabilities of one vocabulary word.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WordLikelihood {
    pub given_spam: f64,
    pub given_ham: f64,
}

/// Outcome of one classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Classification {
    pub label: Label,
    /// `ln P(spam) + Σ ln P(w | spam)`
    pub log_likelihood_spam: f64,
    /// `ln P(ham) + Σ ln P(w | ham)`
    pub log_likelihood_ham: f64,
}

impl Classification {
    /// Likelihood in linear space. May underflow to 0 for long messages.
    pub fn likelihood_spam(&self) -> f64 {
        self.log_likelihood_spam.exp()
    }

    pub fn likelihood_ham(&self) -> f64 {
        self.log_likelihood_ham.exp()
    }

    pub fn is_spam(&self) -> bool {
        self.label == Label::Spam
    }
}

/// Trained, immutable classifier.
#[derive(Debug, Clone)]
pub struct SpamClassifier {
    priors: ClassPriors,
    totals: ClassTotals,
    alpha: f64,
    vocab_size: usize,
    words: HashMap<String, WordLikelihood>,
}

impl SpamClassifier {
    /// Train with Laplace smoothing.
    pub fn new(corpus: &Corpus) -> Result<Self> {
        Self::with_alpha(corpus, DEFAULT_ALPHA)
    }

    /// Train with a custom smoothing constant.
    pub fn with_alpha(corpus: &Corpus, alpha: f64) -> Result<Self> {
        if !alpha.is_finite() || alpha <= 0.0 {
            return Err(ModelError::InvalidSmoothing(alpha));
        }
        let vocab_size = corpus.vocabulary().len();
        if vocab_size == 0 {
            return Err(ModelError::EmptyVocabulary);
        }

        let n_spam = corpus.label_count(Label::Spam);
        let n_ham = corpus.label_count(Label::Ham);
        if n_spam == 0 {
            return Err(ModelError::MissingLabel(Label::Spam));
        }
        if n_ham == 0 {
            return Err(ModelError::MissingLabel(Label::Ham));
        }
        let n = (n_spam + n_ham) as f64;
        let priors = ClassPriors {
            spam: n_spam as f64 / n,
            ham: n_ham as f64 / n,
        };

        let totals = corpus.class_totals();
        let spam_denom = totals.spam as f64 + alpha * vocab_size as f64;
        let ham_denom = totals.ham as f64 + alpha * vocab_size as f64;

        let words = corpus
            .word_counts_by_class()
            .into_iter()
            .map(|(word, (in_spam, in_ham))| {
                let lk = WordLikelihood {
                    given_spam: (in_spam as f64 + alpha) / spam_denom,
                    given_ham: (in_ham as f64 + alpha) / ham_denom,
                };
                (word.to_string(), lk)
            })
            .collect();

        Ok(Self {
            priors,
            totals,
            alpha,
            vocab_size,
            words,
        })
    }

    pub fn priors(&self) -> ClassPriors {
        self.priors
    }

    pub fn totals(&self) -> ClassTotals {
        self.totals
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    /// Smoothed likelihoods of `word`, or `None` when it is out of vocabulary.
    pub fn word_likelihood(&self, word: &str) -> Option<WordLikelihood> {
        self.words.get(word).copied()
    }

    /// Score a token sequence. Repeated tokens count once per occurrence.
    pub fn classify<S: AsRef<str>>(&self, tokens: &[S]) -> Classification {
        let mut log_spam = self.priors.spam.ln();
        let mut log_ham = self.priors.ham.ln();

        for tok in tokens {
            if let Some(lk) = self.words.get(tok.as_ref()) {
                log_spam += lk.given_spam.ln();
                log_ham += lk.given_ham.ln();
            }
        }

        let label = if log_spam > log_ham {
            Label::Spam
        } else {
            Label::Ham
        };

        Classification {
            label,
            log_likelihood_spam: log_spam,
            log_likelihood_ham: log_ham,
        }
    }

    /// Tokenize on whitespace, then [`classify`](Self::classify).
    pub fn classify_text(&self, text: &str) -> Classification {
        self.classify(&tokenize(text))
    }
}
