//! Offline evaluation: how well does the filter hold up once every message
//! has been run through the rewriter?

use std::fmt::Write as _;

use serde::Serialize;
use tracing::info;

use crate::corpus::{Label, LabeledMessage};
use crate::rewriter::AdversarialRewriter;

/// Layer budget used by the evaluation tool unless told otherwise.
pub const DEFAULT_EVAL_MAX_VARIANTS: usize = 5;

/// A spam message the rewriter turned into something classified as ham.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlippedSpam {
    pub original: String,
    pub rewritten: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub total: usize,
    /// Rows whose true label matches the prediction on the rewritten text.
    pub correct: usize,
    pub flipped: Vec<FlippedSpam>,
}

impl EvaluationReport {
    /// Transformed accuracy; 0 for an empty test set.
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }

    /// Original line followed by its rewrite, one pair after another.
    pub fn flipped_as_text(&self) -> String {
        let mut out = String::new();
        for f in &self.flipped {
            let _ = writeln!(out, "{}", f.original);
            let _ = writeln!(out, "{}", f.rewritten);
        }
        out
    }
}

/// Rewrite every message, re-classify the result and tally.
pub fn evaluate(
    rewriter: &AdversarialRewriter,
    messages: &[LabeledMessage],
    max_variants: Option<usize>,
) -> EvaluationReport {
    let mut correct = 0usize;
    let mut flipped = Vec::new();

    for (i, m) in messages.iter().enumerate() {
        let rewrite = rewriter.rewrite(&m.text, max_variants);
        let predicted = rewriter.classify_text(&rewrite.output).label;
        if predicted == m.label {
            correct += 1;
        } else if m.label == Label::Spam && predicted == Label::Ham {
            flipped.push(FlippedSpam {
                original: m.text.clone(),
                rewritten: rewrite.output,
            });
        }
        if (i + 1) % 100 == 0 {
            info!(target: "evaluate", done = i + 1, total = messages.len(), "progress");
        }
    }

    EvaluationReport {
        total: messages.len(),
        correct,
        flipped,
    }
}
