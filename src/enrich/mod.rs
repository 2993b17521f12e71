// src/enrich/mod.rs
//! External news/enrichment collaborator and the per-candidate enrichment
//! adapter built on top of it.

pub mod http;

use anyhow::{Context, Result};

use crate::model::{Candidate, DraftArticle, RawSource, Source};

/// Structured extraction result for one article URL.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Extract {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: String,
}

/// Everything the pipeline needs from the outside world besides storage.
#[async_trait::async_trait]
pub trait NewsClient: Send + Sync {
    async fn list_sources(&self) -> Result<Vec<RawSource>>;
    async fn get_latest(&self, source_id: &str) -> Result<Vec<Candidate>>;
    async fn extract(&self, url: &str) -> Result<Extract>;
    async fn extract_text(&self, url: &str) -> Result<String>;
    async fn extract_topics(&self, text: &str) -> Result<Vec<String>>;
    async fn summarize(&self, title: &str, text: &str) -> Result<String>;
    fn name(&self) -> &'static str;
}

/// Run the four enrichment calls for one accepted candidate, in order:
/// extraction, text content, topics, summary. Any failure fails this
/// candidate only.
pub async fn enrich_candidate(
    client: &dyn NewsClient,
    source: &Source,
    candidate: &Candidate,
) -> Result<DraftArticle> {
    let url = candidate
        .url
        .as_deref()
        .filter(|u| !u.trim().is_empty())
        .context("candidate has no url")?;
    let title = candidate.title.clone().unwrap_or_default();

    let extract = client
        .extract(url)
        .await
        .with_context(|| format!("extract {url}"))?;
    let text = client
        .extract_text(url)
        .await
        .with_context(|| format!("extract text {url}"))?;
    let topics = client
        .extract_topics(&text)
        .await
        .with_context(|| format!("extract topics {url}"))?;
    let summary = client
        .summarize(&title, &text)
        .await
        .with_context(|| format!("summarize {url}"))?;

    Ok(DraftArticle {
        title,
        caption: candidate.description.clone(),
        author: candidate.author.clone(),
        content: extract.content,
        summary,
        topics,
        source_url: url.to_string(),
        source_publisher: source.name.clone(),
        source_publisher_logo_url: source.logos.medium.clone(),
        source_id: source.id.clone(),
        published_at: candidate.published_at_utc(),
    })
}
