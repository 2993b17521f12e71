// src/sentiment.rs
//! Lexicon-based polarity: the score of a text is the plain sum of the
//! per-token weights found in the AFINN-165 word list.

use once_cell::sync::Lazy;
use std::collections::HashMap;

static LEXICON: Lazy<HashMap<String, i32>> = Lazy::new(|| {
    let raw = include_str!("../sentiment_lexicon.json");
    serde_json::from_str::<HashMap<String, i32>>(raw).expect("valid sentiment lexicon")
});

#[derive(Debug, Clone, Default)]
pub struct SentimentAnalyzer;

impl SentimentAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Lexicon weight for one lower-cased token (0 if absent).
    #[inline]
    pub fn word_score(&self, w: &str) -> i32 {
        *LEXICON.get(w).unwrap_or(&0)
    }

    /// Returns (score, token count). Unbounded: no clamping or normalization.
    pub fn score_text(&self, text: &str) -> (i32, usize) {
        let mut score: i32 = 0;
        let mut count = 0usize;
        for tok in tokenize(text) {
            score = score.saturating_add(self.word_score(&tok));
            count += 1;
        }
        (score, count)
    }
}

/// Lower-case word tokens. Apostrophes are dropped so contractions stay one
/// token ("can't" -> "cant"); inner hyphens are kept ("short-sighted").
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !(c.is_alphanumeric() || c == '-' || c == '\'' || c == '\u{2019}'))
        .map(|t| {
            t.trim_matches('-')
                .chars()
                .filter(|c| *c != '\'' && *c != '\u{2019}')
                .flat_map(char::to_lowercase)
                .collect::<String>()
        })
        .filter(|t| !t.is_empty())
}
