// src/relevance.rs
//! Keyword relevance gate: case-insensitive substring matching against a
//! "good" and a "bad" keyword list. Any bad keyword vetoes; otherwise at
//! least one good keyword must be present.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::model::Candidate;

// --- env defaults & names ---
pub const DEFAULT_KEYWORDS_CONFIG_PATH: &str = "config/keywords.toml";
pub const ENV_KEYWORDS_CONFIG_PATH: &str = "KEYWORDS_CONFIG_PATH";

const DEFAULT_GOOD: &[&str] = &[
    "election",
    "congress",
    "senate",
    "president",
    "white house",
    "supreme court",
    "governor",
    "legislation",
    "policy",
    "campaign",
    "democrat",
    "republican",
    "parliament",
    "minister",
    "vote",
    "immigration",
    "tariff",
    "sanctions",
    "impeach",
];

const DEFAULT_BAD: &[&str] = &[
    "recipe",
    "horoscope",
    "celebrity",
    "box office",
    "fashion week",
    "nfl",
    "nba",
    "transfer window",
    "sponsored",
];

/// Outcome of a relevance check, carrying the keyword that decided it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Relevant(String),
    Vetoed(String),
    NoMatch,
}

impl Verdict {
    pub fn is_relevant(&self) -> bool {
        matches!(self, Verdict::Relevant(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordFilter {
    good: Vec<String>,
    bad: Vec<String>,
}

impl Default for KeywordFilter {
    fn default() -> Self {
        Self::new(
            DEFAULT_GOOD.iter().map(|s| s.to_string()),
            DEFAULT_BAD.iter().map(|s| s.to_string()),
        )
    }
}

impl KeywordFilter {
    /// Build from raw lists; entries are trimmed, lower-cased and de-duplicated.
    pub fn new<G, B>(good: G, bad: B) -> Self
    where
        G: IntoIterator<Item = String>,
        B: IntoIterator<Item = String>,
    {
        Self {
            good: clean_list(good),
            bad: clean_list(bad),
        }
    }

    pub fn good(&self) -> &[String] {
        &self.good
    }

    pub fn bad(&self) -> &[String] {
        &self.bad
    }

    /// Bad keywords are checked first and have absolute veto.
    pub fn check(&self, text: &str) -> Verdict {
        let lower = text.to_lowercase();
        if let Some(b) = self.bad.iter().find(|b| lower.contains(b.as_str())) {
            return Verdict::Vetoed(b.clone());
        }
        match self.good.iter().find(|g| lower.contains(g.as_str())) {
            Some(g) => Verdict::Relevant(g.clone()),
            None => Verdict::NoMatch,
        }
    }

    pub fn check_candidate(&self, candidate: &Candidate) -> Verdict {
        self.check(&candidate.relevance_text())
    }

    pub fn is_relevant(&self, candidate: &Candidate) -> bool {
        self.check_candidate(candidate).is_relevant()
    }

    /// Load from an explicit path. Supports TOML or JSON formats.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading keywords from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        parse_keywords(&content, ext.as_str())
    }

    /// Load using env var + fallbacks:
    /// 1) $KEYWORDS_CONFIG_PATH (must exist)
    /// 2) config/keywords.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_KEYWORDS_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!(
                "{ENV_KEYWORDS_CONFIG_PATH} points to non-existent path {}",
                pb.display()
            ));
        }
        let default_path = PathBuf::from(DEFAULT_KEYWORDS_CONFIG_PATH);
        if default_path.exists() {
            return Self::load_from(&default_path);
        }
        tracing::debug!(target: "relevance", "no keyword file found, using built-in lists");
        Ok(Self::default())
    }
}

#[derive(Deserialize)]
struct KeywordFile {
    #[serde(default)]
    good: Vec<String>,
    #[serde(default)]
    bad: Vec<String>,
}

fn parse_keywords(s: &str, hint_ext: &str) -> Result<KeywordFilter> {
    let parsed: KeywordFile = if hint_ext == "json" {
        serde_json::from_str(s).context("parsing keywords json")?
    } else {
        match toml::from_str(s) {
            Ok(v) => v,
            Err(toml_err) => serde_json::from_str(s)
                .map_err(|_| anyhow!("unsupported keywords format: {toml_err}"))?,
        }
    };
    Ok(KeywordFilter::new(parsed.good, parsed.bad))
}

fn clean_list<I: IntoIterator<Item = String>>(items: I) -> Vec<String> {
    let mut set = BTreeSet::new();
    for it in items {
        let t = it.trim().to_lowercase();
        if !t.is_empty() {
            set.insert(t);
        }
    }
    set.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(good: &[&str], bad: &[&str]) -> KeywordFilter {
        KeywordFilter::new(
            good.iter().map(|s| s.to_string()),
            bad.iter().map(|s| s.to_string()),
        )
    }

    fn cand(title: &str, description: &str) -> Candidate {
        Candidate {
            title: Some(title.into()),
            description: Some(description.into()),
            ..Default::default()
        }
    }

    #[test]
    fn bad_keyword_vetoes_even_with_good_match() {
        let f = filter(&["election"], &["celebrity"]);
        let c = cand("Election night", "Celebrity guests at the party");
        assert_eq!(f.check_candidate(&c), Verdict::Vetoed("celebrity".into()));
        assert!(!f.is_relevant(&c));
    }

    #[test]
    fn requires_a_good_keyword() {
        let f = filter(&["election"], &["celebrity"]);
        assert!(!f.is_relevant(&cand("Weather update", "Rain tomorrow")));
        assert!(f.is_relevant(&cand("ELECTION results", "")));
    }

    #[test]
    fn empty_good_list_rejects_everything() {
        let f = filter(&[], &[]);
        assert_eq!(f.check("election senate vote"), Verdict::NoMatch);
    }

    #[test]
    fn lists_are_trimmed_lowercased_and_deduped() {
        let f = filter(&[" Senate ", "senate", ""], &["NFL"]);
        assert_eq!(f.good(), &["senate".to_string()]);
        assert_eq!(f.bad(), &["nfl".to_string()]);
    }

    #[test]
    fn toml_and_json_formats_parse() {
        let t = parse_keywords("good = [\"Vote\"]\nbad = [\"Recipe\"]", "toml").unwrap();
        assert_eq!(t.good(), &["vote".to_string()]);
        let j = parse_keywords(r#"{"good": ["Senate"], "bad": []}"#, "json").unwrap();
        assert_eq!(j.good(), &["senate".to_string()]);
        assert!(j.bad().is_empty());
        // JSON content without a hint still parses through the fallback
        let k = parse_keywords(r#"{"good": ["tariff"]}"#, "").unwrap();
        assert_eq!(k.good(), &["tariff".to_string()]);
    }
}
