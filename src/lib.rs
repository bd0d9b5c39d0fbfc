// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod api;
pub mod classifier;
pub mod config;
pub mod corpus;
pub mod error;
pub mod evaluate;
pub mod lexicon;
pub mod logging;
pub mod metrics;
pub mod paraphrase;
pub mod rewriter;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::api::{app, router, AppState};
pub use crate::classifier::{Classification, SpamClassifier};
pub use crate::corpus::{Corpus, CorpusRow, Label};
pub use crate::error::ModelError;
pub use crate::lexicon::{LexicalResource, Thesaurus};
pub use crate::paraphrase::{ParaphraseGenerator, Variants};
pub use crate::rewriter::{AdversarialRewriter, Rewrite};
pub use crate::store::{IdSequence, MessageStore};
