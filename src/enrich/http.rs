// src/enrich/http.rs
//! reqwest-backed collaborator: a NewsAPI-style listing service
//! (`/sources`, `/articles?source=..&sortBy=latest`) plus an enrichment
//! service exposing `POST /extract`, `/text`, `/topics`, `/summarize`.

use anyhow::{bail, Context, Result};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;

use super::{Extract, NewsClient};
use crate::config::AppConfig;
use crate::model::{Candidate, RawSource, SortBy};

pub struct HttpNewsClient {
    http: Client,
    news_base: String,
    api_key: String,
    enrich_base: String,
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    sources: Vec<RawSource>,
    #[serde(default)]
    articles: Vec<Candidate>,
}

impl Envelope {
    fn check(self, what: &str) -> Result<Self> {
        match self.status.as_deref() {
            Some("error") => bail!(
                "{what}: {}",
                self.message.as_deref().unwrap_or("unknown error")
            ),
            _ => Ok(self),
        }
    }
}

#[derive(Serialize)]
struct UrlReq<'a> {
    url: &'a str,
}

#[derive(Serialize)]
struct TextReq<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct SummarizeReq<'a> {
    title: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct TextResp {
    text: String,
}

#[derive(Deserialize)]
struct TopicsResp {
    topics: Vec<String>,
}

#[derive(Deserialize)]
struct SummaryResp {
    summary: String,
}

impl HttpNewsClient {
    pub fn new(
        news_base: impl Into<String>,
        api_key: impl Into<String>,
        enrich_base: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("news-sentiment-pipeline/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(4))
            .timeout(timeout)
            .build()
            .context("building http client")?;
        Ok(Self {
            http,
            news_base: trim_base(news_base.into()),
            api_key: api_key.into(),
            enrich_base: trim_base(enrich_base.into()),
        })
    }

    pub fn from_config(cfg: &AppConfig) -> Result<Self> {
        if cfg.news_api_key.is_empty() {
            tracing::warn!("NEWS_API_KEY is empty; listing calls will likely be rejected");
        }
        Self::new(
            cfg.news_api_base_url.clone(),
            cfg.news_api_key.clone(),
            cfg.enrich_base_url.clone(),
            Duration::from_secs(cfg.http_timeout_secs),
        )
    }

    async fn get_envelope(&self, path: &str, query: &[(&str, &str)]) -> Result<Envelope> {
        let url = format!("{}/{}", self.news_base, path);
        let resp = self
            .http
            .get(&url)
            .query(query)
            .query(&[("apiKey", self.api_key.as_str())])
            .send()
            .await
            .with_context(|| format!("GET {url}"))?
            .error_for_status()
            .with_context(|| format!("GET {url} non-2xx"))?;
        let env: Envelope = resp
            .json()
            .await
            .with_context(|| format!("decoding {url}"))?;
        env.check(path)
    }

    async fn post_enrich<B: Serialize, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R> {
        let url = format!("{}/{}", self.enrich_base, path);
        self.http
            .post(&url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("POST {url}"))?
            .error_for_status()
            .with_context(|| format!("POST {url} non-2xx"))?
            .json::<R>()
            .await
            .with_context(|| format!("decoding {url}"))
    }
}

fn trim_base(s: String) -> String {
    s.trim_end_matches('/').to_string()
}

#[async_trait::async_trait]
impl NewsClient for HttpNewsClient {
    async fn list_sources(&self) -> Result<Vec<RawSource>> {
        Ok(self.get_envelope("sources", &[]).await?.sources)
    }

    async fn get_latest(&self, source_id: &str) -> Result<Vec<Candidate>> {
        let env = self
            .get_envelope(
                "articles",
                &[("source", source_id), ("sortBy", SortBy::Latest.as_str())],
            )
            .await?;
        Ok(env.articles)
    }

    async fn extract(&self, url: &str) -> Result<Extract> {
        self.post_enrich("extract", &UrlReq { url }).await
    }

    async fn extract_text(&self, url: &str) -> Result<String> {
        let r: TextResp = self.post_enrich("text", &UrlReq { url }).await?;
        Ok(r.text)
    }

    async fn extract_topics(&self, text: &str) -> Result<Vec<String>> {
        let r: TopicsResp = self.post_enrich("topics", &TextReq { text }).await?;
        Ok(r.topics)
    }

    async fn summarize(&self, title: &str, text: &str) -> Result<String> {
        let r: SummaryResp = self
            .post_enrich("summarize", &SummarizeReq { title, text })
            .await?;
        Ok(r.summary)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
