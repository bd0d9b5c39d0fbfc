//! Construction-time errors for the spam model.
//!
//! Everything past construction is total: classification, expansion and
//! rewriting never fail.

use thiserror::Error;

use crate::corpus::Label;

/// Result alias for model construction.
pub type Result<T> = std::result::Result<T, ModelError>;

/// Fatal problems with the training data or model parameters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// No training row carries this label, so its prior is undefined.
    #[error("corpus has no rows labeled '{0}'")]
    MissingLabel(Label),

    /// The corpus defines no trainable words.
    #[error("corpus vocabulary is empty")]
    EmptyVocabulary,

    /// A row counts a word that is not a vocabulary column.
    #[error("row {row} counts '{word}', which is not in the vocabulary")]
    UnknownWord { row: usize, word: String },

    /// Smoothing constant must be finite and strictly positive.
    #[error("smoothing alpha must be finite and > 0, got {0}")]
    InvalidSmoothing(f64),
}
