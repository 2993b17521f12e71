// src/model.rs
//! Persisted records (`Source`, `Article`) and the raw shapes returned by the
//! news collaborator (`RawSource`, `Candidate`).
//!
//! Documents are stored camelCase, keyed by `id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Fetch modes a source may support on the collaborator side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    Top,
    Popular,
    Latest,
}

impl SortBy {
    pub const ALL: [SortBy; 3] = [SortBy::Top, SortBy::Popular, SortBy::Latest];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Top => "top",
            SortBy::Popular => "popular",
            SortBy::Latest => "latest",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Logos {
    #[serde(default)]
    pub small: Option<String>,
    #[serde(default)]
    pub medium: Option<String>,
    #[serde(default)]
    pub large: Option<String>,
}

/// Canonical news source. Descriptive fields come from the catalog; the two
/// averages are owned by the rescore job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub logos: Logos,
    #[serde(default)]
    pub sort_capabilities: BTreeSet<SortBy>,
    #[serde(default)]
    pub sentiment_avg: Option<f64>,
    #[serde(default)]
    pub vocab_avg: Option<f64>,
}

impl Source {
    pub fn supports(&self, mode: SortBy) -> bool {
        self.sort_capabilities.contains(&mode)
    }
}

/// Source record as listed by the collaborator.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSource {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub urls_to_logos: Logos,
    #[serde(default)]
    pub sort_bys_available: Vec<String>,
}

/// Raw article metadata, not yet enriched or scored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub url_to_image: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    /// Short text snippet some listings carry; used only as a relevance fallback.
    #[serde(default)]
    pub content: Option<String>,
}

impl Candidate {
    /// Text the keyword filter runs over: title and description, falling back
    /// to the content snippet, falling back to nothing.
    pub fn relevance_text(&self) -> String {
        match (self.title.as_deref(), self.description.as_deref()) {
            (None, None) => self.content.clone().unwrap_or_default(),
            (t, d) => format!("{} {}", t.unwrap_or_default(), d.unwrap_or_default())
                .trim()
                .to_string(),
        }
    }

    /// RFC 3339 `publishedAt` of the candidate itself, if present and valid.
    pub fn published_at_utc(&self) -> Option<DateTime<Utc>> {
        self.published_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    #[default]
    Published,
}

/// Enriched article still missing its id and scores.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftArticle {
    pub title: String,
    pub caption: Option<String>,
    pub author: Option<String>,
    pub content: String,
    pub summary: String,
    pub topics: Vec<String>,
    pub source_url: String,
    pub source_publisher: String,
    pub source_publisher_logo_url: Option<String>,
    pub source_id: String,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub topics: Vec<String>,
    pub source_url: String,
    #[serde(default)]
    pub source_publisher: String,
    #[serde(default)]
    pub source_publisher_logo_url: Option<String>,
    pub source_id: String,
    #[serde(default)]
    pub status: ArticleStatus,
    #[serde(default)]
    pub sentiment: i32,
    #[serde(default)]
    pub vocab: f64,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

impl Article {
    /// Materialize a scored draft under its content-addressed id.
    pub fn from_draft(draft: DraftArticle, id: String, sentiment: i32, vocab: f64) -> Self {
        Self {
            id,
            title: draft.title,
            caption: draft.caption,
            author: draft.author,
            content: draft.content,
            summary: draft.summary,
            topics: draft.topics,
            source_url: draft.source_url,
            source_publisher: draft.source_publisher,
            source_publisher_logo_url: draft.source_publisher_logo_url,
            source_id: draft.source_id,
            status: ArticleStatus::Published,
            sentiment,
            vocab,
            published_at: draft.published_at,
        }
    }

    /// Drop the heavy enrichment fields, keeping identity, scores and timing.
    pub fn slimmed(self) -> Self {
        Self {
            id: self.id,
            title: self.title,
            author: self.author,
            source_url: self.source_url,
            source_id: self.source_id,
            status: self.status,
            sentiment: self.sentiment,
            vocab: self.vocab,
            published_at: self.published_at,
            ..Self::default()
        }
    }
}
