// src/scoring.rs
//! Article scoring: lexicon sentiment and a vocabulary-complexity proxy
//! (squared mean word length). Both run over markup-stripped content and
//! never fail.

use once_cell::sync::OnceCell;
use regex::Regex;

use crate::sentiment::SentimentAnalyzer;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scores {
    pub sentiment: i32,
    pub vocab: f64,
}

/// Strip markup: decode HTML entities, drop tags, collapse whitespace.
pub fn strip_markup(s: &str) -> String {
    let decoded = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[^>]+>").unwrap());
    // Tags are replaced by a space so adjacent block elements don't glue words together.
    let out = re_tags.replace_all(&decoded, " ");

    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());
    re_ws.replace_all(&out, " ").trim().to_string()
}

/// Raw lexicon sum over the stripped content.
pub fn sentiment_score(content: &str) -> i32 {
    SentimentAnalyzer::new().score_text(&strip_markup(content)).0
}

/// Mean word length (in chars) squared. `0.0` when there are no words.
pub fn vocab_score(content: &str) -> f64 {
    let stripped = strip_markup(content);
    let (total, count) = stripped
        .split_whitespace()
        .fold((0usize, 0usize), |(t, n), w| (t + w.chars().count(), n + 1));
    if count == 0 {
        return 0.0;
    }
    let mean = total as f64 / count as f64;
    mean * mean
}

pub fn score_content(content: &str) -> Scores {
    Scores {
        sentiment: sentiment_score(content),
        vocab: vocab_score(content),
    }
}
