//! Synonym lookup.
//!
//! [`LexicalResource`] is a read-only oracle: token in, ordered candidate
//! replacements out (most salient sense first). [`Thesaurus`] is the bundled
//! in-memory implementation, loaded from TOML or JSON.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

/// Read-only synonym oracle. Must return the same list for the same token on
/// every call and be safe to query from several threads at once.
pub trait LexicalResource: Send + Sync {
    /// Ordered replacement candidates for `token`; empty when none are known.
    fn synonyms(&self, token: &str) -> Vec<String>;
}

impl<T: LexicalResource + ?Sized> LexicalResource for &T {
    fn synonyms(&self, token: &str) -> Vec<String> {
        (**self).synonyms(token)
    }
}

impl<T: LexicalResource + ?Sized> LexicalResource for Arc<T> {
    fn synonyms(&self, token: &str) -> Vec<String> {
        (**self).synonyms(token)
    }
}

impl<T: LexicalResource + ?Sized> LexicalResource for Box<T> {
    fn synonyms(&self, token: &str) -> Vec<String> {
        (**self).synonyms(token)
    }
}

/// Plain map, exact-match lookup.
impl LexicalResource for HashMap<String, Vec<String>> {
    fn synonyms(&self, token: &str) -> Vec<String> {
        self.get(token).cloned().unwrap_or_default()
    }
}

static BUILTIN_THESAURUS: &str = include_str!("../data/thesaurus.json");

/// In-memory thesaurus. Lookups try the token verbatim, then lowercased.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Thesaurus {
    entries: HashMap<String, Vec<String>>,
}

impl Thesaurus {
    pub fn new(entries: HashMap<String, Vec<String>>) -> Self {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k, clean_candidates(v)))
            .collect();
        Self { entries }
    }

    /// Small English thesaurus compiled into the binary.
    pub fn builtin() -> Result<Self> {
        parse_thesaurus(BUILTIN_THESAURUS, "json").context("parsing built-in thesaurus")
    }

    /// Load from a `.toml` (`[synonyms]` table) or `.json` (object) file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading thesaurus from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        parse_thesaurus(&content, &ext)
            .with_context(|| format!("parsing thesaurus at {}", path.display()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl LexicalResource for Thesaurus {
    fn synonyms(&self, token: &str) -> Vec<String> {
        if let Some(v) = self.entries.get(token) {
            return v.clone();
        }
        let lower = token.to_lowercase();
        if lower != token {
            if let Some(v) = self.entries.get(&lower) {
                return v.clone();
            }
        }
        Vec::new()
    }
}

fn parse_thesaurus(s: &str, hint_ext: &str) -> Result<Thesaurus> {
    let try_toml = hint_ext == "toml" || s.contains("[synonyms]");
    if try_toml {
        if let Ok(t) = parse_toml(s) {
            return Ok(t);
        }
    }
    if let Ok(t) = parse_json(s) {
        return Ok(t);
    }
    if !try_toml {
        if let Ok(t) = parse_toml(s) {
            return Ok(t);
        }
    }
    Err(anyhow!("unsupported thesaurus format"))
}

fn parse_toml(s: &str) -> Result<Thesaurus> {
    #[derive(Deserialize)]
    struct TomlThesaurus {
        synonyms: HashMap<String, Vec<String>>,
    }
    let t: TomlThesaurus = toml::from_str(s)?;
    Ok(Thesaurus::new(t.synonyms))
}

fn parse_json(s: &str) -> Result<Thesaurus> {
    let m: HashMap<String, Vec<String>> = serde_json::from_str(s)?;
    Ok(Thesaurus::new(m))
}

/// Trim and drop blanks; replacements must stay single tokens, so inner
/// whitespace becomes `_`.
/// Drop blank candidates and glue multi-word ones with `_` so a replacement
/// is always exactly one token.
pub(crate) fn clean_candidates(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .filter_map(|c| {
            let t = c.trim();
            if t.is_empty() {
                None
            } else {
                Some(t.split_whitespace().collect::<Vec<_>>().join("_"))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_and_json_formats() {
        let toml = r#"
[synonyms]
free = ["complimentary", "gratis"]
cash = [" money ", ""]
"#;
        let t = parse_thesaurus(toml, "toml").unwrap();
        assert_eq!(t.synonyms("free"), vec!["complimentary", "gratis"]);
        assert_eq!(t.synonyms("cash"), vec!["money"]);

        let json = r#"{ "win": ["gain", "acquire"] }"#;
        let j = parse_thesaurus(json, "").unwrap();
        assert_eq!(j.synonyms("win"), vec!["gain", "acquire"]);
    }

    #[test]
    fn multiword_candidates_stay_one_token() {
        let t = Thesaurus::new(HashMap::from([(
            "call".to_string(),
            vec!["phone call".to_string()],
        )]));
        assert_eq!(t.synonyms("call"), vec!["phone_call"]);
    }

    #[test]
    fn falls_back_to_lowercase() {
        let t = Thesaurus::new(HashMap::from([(
            "free".to_string(),
            vec!["gratis".to_string()],
        )]));
        assert_eq!(t.synonyms("FREE"), vec!["gratis"]);
        assert!(t.synonyms("unknown").is_empty());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_thesaurus("not a thesaurus", "txt").is_err());
    }

    #[test]
    fn builtin_parses_and_is_ordered() {
        let t = Thesaurus::builtin().unwrap();
        assert!(!t.is_empty());
        let free = t.synonyms("free");
        assert!(!free.is_empty());
        assert_eq!(free, t.synonyms("free"));
    }

    #[test]
    fn shared_handles_delegate() {
        let t = Arc::new(Thesaurus::new(HashMap::from([(
            "win".to_string(),
            vec!["gain".to_string()],
        )])));
        let dynamic: Box<dyn LexicalResource> = Box::new(t.clone());
        assert_eq!(dynamic.synonyms("win"), vec!["gain"]);
        assert_eq!((&*t).synonyms("win"), vec!["gain"]);
    }
}
