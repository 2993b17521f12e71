// tests/common/mod.rs
// Shared test doubles: a scriptable news collaborator and a store that fails writes.
#![allow(dead_code)]

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use news_sentiment_pipeline::enrich::{Extract, NewsClient};
use news_sentiment_pipeline::model::{Candidate, Logos, RawSource, SortBy, Source};
use news_sentiment_pipeline::store::{memory::MemoryStore, Filter, Store};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
pub struct StubClient {
    pub raw_sources: Vec<RawSource>,
    /// source id -> candidates; missing id => listing error
    pub latest: HashMap<String, Vec<Candidate>>,
    /// url -> extracted content; default "aaa bbb"
    pub content: Mutex<HashMap<String, String>>,
    pub fail_urls: HashSet<String>,
    /// urls whose extraction panics instead of returning an error
    pub panic_urls: HashSet<String>,
    pub delays: HashMap<String, Duration>,
    pub default_delay: Option<Duration>,
    pub latest_calls: Mutex<Vec<String>>,
    pub extract_calls: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl StubClient {
    pub fn with_latest(mut self, source_id: &str, candidates: Vec<Candidate>) -> Self {
        self.latest.insert(source_id.to_string(), candidates);
        self
    }

    pub fn set_content(&self, url: &str, content: &str) {
        self.content
            .lock()
            .unwrap()
            .insert(url.to_string(), content.to_string());
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn extracts(&self) -> usize {
        self.extract_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NewsClient for StubClient {
    async fn list_sources(&self) -> Result<Vec<RawSource>> {
        Ok(self.raw_sources.clone())
    }

    async fn get_latest(&self, source_id: &str) -> Result<Vec<Candidate>> {
        self.latest_calls.lock().unwrap().push(source_id.to_string());
        self.latest
            .get(source_id)
            .cloned()
            .ok_or_else(|| anyhow!("listing unavailable for {source_id}"))
    }

    async fn extract(&self, url: &str) -> Result<Extract> {
        self.extract_calls.fetch_add(1, Ordering::SeqCst);
        if self.panic_urls.contains(url) {
            panic!("extractor crashed on {url}");
        }
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(d) = self.delays.get(url).copied().or(self.default_delay) {
            tokio::time::sleep(d).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail_urls.contains(url) {
            bail!("extraction failed for {url}");
        }
        let content = self
            .content
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or_else(|| "aaa bbb".to_string());
        Ok(Extract {
            title: None,
            content,
        })
    }

    async fn extract_text(&self, url: &str) -> Result<String> {
        Ok(format!("text of {url}"))
    }

    async fn extract_topics(&self, _text: &str) -> Result<Vec<String>> {
        Ok(vec!["politics".to_string()])
    }

    async fn summarize(&self, title: &str, _text: &str) -> Result<String> {
        Ok(format!("summary: {title}"))
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

pub fn source(id: &str, modes: &[SortBy]) -> Source {
    Source {
        id: id.to_string(),
        name: format!("{id} news"),
        logos: Logos {
            medium: Some(format!("https://logos.test/{id}.png")),
            ..Default::default()
        },
        sort_capabilities: modes.iter().copied().collect(),
        ..Default::default()
    }
}

pub fn candidate(title: &str, description: &str, url: &str) -> Candidate {
    Candidate {
        title: Some(title.to_string()),
        description: Some(description.to_string()),
        url: Some(url.to_string()),
        author: Some("Staff".to_string()),
        published_at: Some("2017-03-01T09:00:00Z".to_string()),
        ..Default::default()
    }
}

pub async fn seeded_store(sources: &[Source]) -> MemoryStore {
    let store = MemoryStore::new();
    news_sentiment_pipeline::store::upsert_records(&store, "sources", sources)
        .await
        .unwrap();
    store
}

/// Reads pass through to memory; writes to `fail_collection` error.
pub struct FailingWrites {
    pub inner: MemoryStore,
    pub fail_collection: &'static str,
}

#[async_trait]
impl Store for FailingWrites {
    async fn upsert_many(&self, collection: &str, docs: Vec<Value>) -> Result<usize> {
        if collection == self.fail_collection {
            bail!("disk full");
        }
        self.inner.upsert_many(collection, docs).await
    }

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Value>> {
        self.inner.find(collection, filter).await
    }
}
