//! # Training corpus
//!
//! A pre-vectorized, labeled training set: each row is `(label, text, counts)`
//! where `counts` maps vocabulary words to their occurrences in that row.
//! The vocabulary is fixed when the corpus is built and never changes.
//!
//! JSON shape accepted by [`Corpus::load`]:
//! ```json
//! {
//!   "vocabulary": ["free", "offer", "meeting"],
//!   "rows": [
//!     { "label": "spam", "text": "free offer", "counts": { "free": 1, "offer": 1 } },
//!     { "label": "ham",  "text": "meeting",    "counts": { "meeting": 1 } }
//!   ]
//! }
//! ```

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ModelError, Result};

/// Class label of a message.
///
/// Serialized lowercase; deserialized through `FromStr`, so any casing works.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Label {
    Spam,
    Ham,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Spam => "spam",
            Label::Ham => "ham",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("spam") {
            Ok(Label::Spam)
        } else if s.eq_ignore_ascii_case("ham") {
            Ok(Label::Ham)
        } else {
            anyhow::bail!("unknown label '{s}' (expected 'spam' or 'ham')")
        }
    }
}

impl TryFrom<String> for Label {
    type Error = anyhow::Error;

    fn try_from(s: String) -> anyhow::Result<Self> {
        s.parse()
    }
}

/// Whitespace tokenizer shared by training, classification and paraphrasing.
/// Order and duplicates are preserved.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// One labeled training row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusRow {
    pub label: Label,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub counts: HashMap<String, u32>,
}

impl CorpusRow {
    /// Token-occurrence mass of this row.
    pub fn total_tokens(&self) -> u64 {
        self.counts.values().map(|&c| u64::from(c)).sum()
    }
}

/// A raw labeled message, as found in held-out test sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledMessage {
    pub label: Label,
    pub text: String,
}

/// Token-occurrence mass per class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassTotals {
    pub spam: u64,
    pub ham: u64,
}

impl ClassTotals {
    pub fn for_label(&self, label: Label) -> u64 {
        match label {
            Label::Spam => self.spam,
            Label::Ham => self.ham,
        }
    }
}

#[derive(Deserialize)]
struct CorpusFile {
    vocabulary: Vec<String>,
    #[serde(default)]
    rows: Vec<CorpusRow>,
}

/// Immutable, validated training set.
#[derive(Debug, Clone)]
pub struct Corpus {
    vocabulary: BTreeSet<String>,
    rows: Vec<CorpusRow>,
}

impl Corpus {
    /// Build a corpus from an explicit vocabulary and rows.
    ///
    /// Fails if the vocabulary is empty, a row counts a word outside the
    /// vocabulary, or either label has no rows.
    pub fn new<I, S>(vocabulary: I, rows: Vec<CorpusRow>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let vocabulary: BTreeSet<String> = vocabulary
            .into_iter()
            .map(Into::into)
            .filter(|w| !w.trim().is_empty())
            .collect();
        if vocabulary.is_empty() {
            return Err(ModelError::EmptyVocabulary);
        }

        for (i, row) in rows.iter().enumerate() {
            if let Some(word) = row.counts.keys().find(|w| !vocabulary.contains(*w)) {
                return Err(ModelError::UnknownWord {
                    row: i,
                    word: word.clone(),
                });
            }
        }

        for label in [Label::Spam, Label::Ham] {
            if !rows.iter().any(|r| r.label == label) {
                return Err(ModelError::MissingLabel(label));
            }
        }

        Ok(Self { vocabulary, rows })
    }

    /// Vectorize raw labeled texts: every distinct whitespace token becomes a
    /// vocabulary column and each row counts its own tokens.
    pub fn from_labeled_texts<I, S>(messages: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Label, S)>,
        S: Into<String>,
    {
        let mut vocabulary = BTreeSet::new();
        let mut rows = Vec::new();
        for (label, text) in messages {
            let text: String = text.into();
            let mut counts: HashMap<String, u32> = HashMap::new();
            for tok in tokenize(&text) {
                *counts.entry(tok.to_string()).or_insert(0) += 1;
                vocabulary.insert(tok.to_string());
            }
            rows.push(CorpusRow {
                label,
                text,
                counts,
            });
        }
        Self::new(vocabulary, rows)
    }

    /// Parse the JSON corpus format (see module docs).
    pub fn from_json_str(s: &str) -> anyhow::Result<Self> {
        let file: CorpusFile = serde_json::from_str(s).context("parsing corpus json")?;
        Ok(Self::new(file.vocabulary, file.rows)?)
    }

    /// Load a JSON corpus from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading corpus from {}", path.display()))?;
        let corpus = Self::from_json_str(&content)
            .with_context(|| format!("loading corpus from {}", path.display()))?;
        info!(
            target: "corpus",
            path = %path.display(),
            rows = corpus.len(),
            vocabulary = corpus.vocabulary.len(),
            "corpus loaded"
        );
        Ok(corpus)
    }

    pub fn vocabulary(&self) -> &BTreeSet<String> {
        &self.vocabulary
    }

    pub fn contains_word(&self, word: &str) -> bool {
        self.vocabulary.contains(word)
    }

    pub fn rows(&self) -> &[CorpusRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows carrying `label`.
    pub fn label_count(&self, label: Label) -> usize {
        self.rows.iter().filter(|r| r.label == label).count()
    }

    /// Sum of per-row token totals, split by class.
    pub fn class_totals(&self) -> ClassTotals {
        let mut totals = ClassTotals::default();
        for row in &self.rows {
            match row.label {
                Label::Spam => totals.spam += row.total_tokens(),
                Label::Ham => totals.ham += row.total_tokens(),
            }
        }
        totals
    }

    /// Per-word occurrence counts summed over each class, in one pass.
    pub fn word_counts_by_class(&self) -> HashMap<&str, (u64, u64)> {
        let mut out: HashMap<&str, (u64, u64)> = self
            .vocabulary
            .iter()
            .map(|w| (w.as_str(), (0, 0)))
            .collect();
        for row in &self.rows {
            for (word, &n) in &row.counts {
                if let Some(entry) = out.get_mut(word.as_str()) {
                    match row.label {
                        Label::Spam => entry.0 += u64::from(n),
                        Label::Ham => entry.1 += u64::from(n),
                    }
                }
            }
        }
        out
    }
}

/// Load a held-out set of labeled messages (JSON array of `{label, text}`).
pub fn load_labeled_messages<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<LabeledMessage>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading labeled messages from {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("parsing labeled messages from {}", path.display()))
}
