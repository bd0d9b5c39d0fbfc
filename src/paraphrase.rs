//! Layered synonym substitution.
//!
//! Layer `k` starts from the original tokens and replaces every occurrence of
//! each substitutable word with its `k`-th candidate (or its last one when the
//! list is shorter). Words without candidates are left alone. Layers are
//! produced lazily and in order, so a consumer can stop at the first one it
//! likes.

use std::collections::HashMap;
use std::iter::FusedIterator;
use std::sync::Arc;

use crate::corpus::tokenize;
use crate::lexicon::{clean_candidates, LexicalResource};

/// Candidates for one distinct token, plus where it occurs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynonymEntry {
    pub token: String,
    pub positions: Vec<usize>,
    pub candidates: Vec<String>,
}

impl SynonymEntry {
    /// Replacement at `layer`, saturating at the last candidate.
    fn candidate_at(&self, layer: usize) -> Option<&str> {
        self.candidates
            .get(layer)
            .or_else(|| self.candidates.last())
            .map(String::as_str)
    }
}

/// Per-message synonym lookups, one entry per distinct token in
/// first-occurrence order. Lives only as long as one expansion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SynonymTable {
    entries: Vec<SynonymEntry>,
}

impl SynonymTable {
    /// Query `lexicon` once for each distinct token.
    pub fn build<S: AsRef<str>>(tokens: &[S], lexicon: &dyn LexicalResource) -> Self {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut entries: Vec<SynonymEntry> = Vec::new();
        for (pos, tok) in tokens.iter().enumerate() {
            let tok = tok.as_ref();
            match index.get(tok) {
                Some(&i) => entries[i].positions.push(pos),
                None => {
                    index.insert(tok, entries.len());
                    entries.push(SynonymEntry {
                        token: tok.to_string(),
                        positions: vec![pos],
                        candidates: clean_candidates(lexicon.synonyms(tok)),
                    });
                }
            }
        }
        Self { entries }
    }

    pub fn entries(&self) -> &[SynonymEntry] {
        &self.entries
    }

    /// Longest candidate list; the default number of layers.
    pub fn max_candidates(&self) -> usize {
        self.entries
            .iter()
            .map(|e| e.candidates.len())
            .max()
            .unwrap_or(0)
    }

    pub fn get(&self, token: &str) -> Option<&SynonymEntry> {
        self.entries.iter().find(|e| e.token == token)
    }
}

/// Builds [`Variants`] from a shared lexical resource.
#[derive(Clone)]
pub struct ParaphraseGenerator {
    lexicon: Arc<dyn LexicalResource>,
}

impl std::fmt::Debug for ParaphraseGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParaphraseGenerator").finish_non_exhaustive()
    }
}

impl ParaphraseGenerator {
    pub fn new<L: LexicalResource + 'static>(lexicon: L) -> Self {
        Self {
            lexicon: Arc::new(lexicon),
        }
    }

    pub fn from_shared(lexicon: Arc<dyn LexicalResource>) -> Self {
        Self { lexicon }
    }

    pub fn lexicon(&self) -> &dyn LexicalResource {
        self.lexicon.as_ref()
    }

    /// Lazily produce the substitution layers of `text`.
    ///
    /// `max_variants` defaults to the longest candidate list among the
    /// message's tokens. Text without tokens yields nothing.
    pub fn expand(&self, text: &str, max_variants: Option<usize>) -> Variants {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return Variants::empty();
        }
        let table = SynonymTable::build(&tokens, self.lexicon.as_ref());
        let count = max_variants.unwrap_or_else(|| table.max_candidates());
        Variants {
            tokens: tokens.into_iter().map(str::to_string).collect(),
            table,
            layer: 0,
            count,
        }
    }
}

/// Iterator over substitution layers, joined back with single spaces.
#[derive(Debug, Clone)]
pub struct Variants {
    tokens: Vec<String>,
    table: SynonymTable,
    layer: usize,
    count: usize,
}

impl Variants {
    fn empty() -> Self {
        Self {
            tokens: Vec::new(),
            table: SynonymTable::default(),
            layer: 0,
            count: 0,
        }
    }

    /// Index of the layer the next call to `next` yields.
    pub fn layer(&self) -> usize {
        self.layer
    }

    /// Total number of layers this iterator was built with.
    pub fn layer_count(&self) -> usize {
        self.count
    }

    pub fn synonym_table(&self) -> &SynonymTable {
        &self.table
    }

    fn build_layer(&self, layer: usize) -> String {
        let mut out: Vec<&str> = self.tokens.iter().map(String::as_str).collect();
        for entry in &self.table.entries {
            if let Some(replacement) = entry.candidate_at(layer) {
                for &pos in &entry.positions {
                    out[pos] = replacement;
                }
            }
        }
        out.join(" ")
    }
}

impl Iterator for Variants {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.layer >= self.count {
            return None;
        }
        let v = self.build_layer(self.layer);
        self.layer += 1;
        Some(v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.count.saturating_sub(self.layer);
        (n, Some(n))
    }
}

impl ExactSizeIterator for Variants {}

impl FusedIterator for Variants {}
