//! Rewrite a labeled test set and report how often the filter still gets the
//! label right afterwards.
//!
//! ```text
//! cargo run --bin evaluate -- --test-set data/test_messages.json --out successful_transforms.txt
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use dnasb_transformer::{
    api::AppState,
    config::AppConfig,
    corpus::load_labeled_messages,
    evaluate::{evaluate, DEFAULT_EVAL_MAX_VARIANTS},
    logging::init_cli_tracing,
};

#[derive(Debug, Parser)]
#[command(name = "evaluate", about = "Transformed accuracy of the spam filter")]
struct Args {
    /// JSON array of {"label", "text"} rows.
    #[arg(long)]
    test_set: PathBuf,

    /// Config file; falls back to TRANSFORMER_CONFIG_PATH / config/transformer.toml.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = DEFAULT_EVAL_MAX_VARIANTS)]
    max_variants: usize,

    /// Where to write (original, rewritten) line pairs of flipped spam.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_cli_tracing();

    let args = Args::parse();
    let cfg = match &args.config {
        Some(p) => {
            let mut cfg = AppConfig::load_from(p)?;
            cfg.apply_env_overrides();
            cfg
        }
        None => AppConfig::from_env()?,
    };

    let state = AppState::from_config(&cfg)?;
    println!("Reading test data...");
    let messages = load_labeled_messages(&args.test_set)?;
    println!("Finished reading {} messages", messages.len());

    let report = evaluate(&state.rewriter, &messages, Some(args.max_variants));

    if let Some(out) = &args.out {
        fs::write(out, report.flipped_as_text())
            .with_context(|| format!("writing {}", out.display()))?;
    }

    println!("Flipped spam: {}", report.flipped.len());
    println!("Transformed Accuracy: {:.4}", report.accuracy());
    Ok(())
}
