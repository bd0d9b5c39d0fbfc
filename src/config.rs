// src/config.rs
//! Service configuration: TOML file + env overrides.
//!
//! ```toml
//! corpus_path = "data/corpus.json"
//! thesaurus_path = "data/thesaurus.toml"   # optional, built-in when absent
//! alpha = 1.0
//! default_max_variants = 5                 # optional
//! metrics = false
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::classifier::DEFAULT_ALPHA;

pub const DEFAULT_CONFIG_PATH: &str = "config/transformer.toml";
pub const DEFAULT_CORPUS_PATH: &str = "data/corpus.json";

pub const ENV_CONFIG_PATH: &str = "TRANSFORMER_CONFIG_PATH";
pub const ENV_CORPUS_PATH: &str = "CORPUS_PATH";
pub const ENV_THESAURUS_PATH: &str = "THESAURUS_PATH";
pub const ENV_ALPHA: &str = "SMOOTHING_ALPHA";
pub const ENV_MAX_VARIANTS: &str = "MAX_VARIANTS";
pub const ENV_METRICS: &str = "TRANSFORMER_METRICS";

fn default_corpus_path() -> PathBuf {
    PathBuf::from(DEFAULT_CORPUS_PATH)
}
fn default_alpha() -> f64 {
    DEFAULT_ALPHA
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_corpus_path")]
    pub corpus_path: PathBuf,
    #[serde(default)]
    pub thesaurus_path: Option<PathBuf>,
    /// Additive smoothing constant.
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    /// Layer budget when a request does not name one.
    #[serde(default)]
    pub default_max_variants: Option<usize>,
    #[serde(default)]
    pub metrics: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            corpus_path: default_corpus_path(),
            thesaurus_path: None,
            alpha: default_alpha(),
            default_max_variants: None,
            metrics: false,
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Load from an explicit path, without env overrides.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("parsing config at {}", path.display()))
    }

    /// Resolve the config:
    /// 1) $TRANSFORMER_CONFIG_PATH (must exist)
    /// 2) config/transformer.toml (if present)
    /// 3) defaults
    ///
    /// then apply env overrides.
    pub fn from_env() -> Result<Self> {
        let mut cfg = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            Self::load_from(Path::new(&p))?
        } else {
            let fallback = PathBuf::from(DEFAULT_CONFIG_PATH);
            if fallback.exists() {
                Self::load_from(&fallback)?
            } else {
                Self::default()
            }
        };
        cfg.apply_env_overrides();
        info!(target: "config", ?cfg, "configuration resolved");
        Ok(cfg)
    }

    /// Env wins over file values. Unparsable values are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Some(p) = env_nonempty(ENV_CORPUS_PATH) {
            self.corpus_path = PathBuf::from(p);
        }
        if let Some(p) = env_nonempty(ENV_THESAURUS_PATH) {
            self.thesaurus_path = Some(PathBuf::from(p));
        }
        if let Some(a) = env_nonempty(ENV_ALPHA).and_then(|s| s.parse::<f64>().ok()) {
            self.alpha = a;
        }
        if let Some(n) = env_nonempty(ENV_MAX_VARIANTS).and_then(|s| s.parse::<usize>().ok()) {
            self.default_max_variants = Some(n);
        }
        if let Some(m) = env_nonempty(ENV_METRICS) {
            self.metrics = matches!(m.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
