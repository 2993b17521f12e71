// src/config.rs
//! Process configuration from the environment (after `.env`).

use std::path::PathBuf;

pub const ENV_NEWS_API_BASE_URL: &str = "NEWS_API_BASE_URL";
pub const ENV_NEWS_API_KEY: &str = "NEWS_API_KEY";
pub const ENV_ENRICH_BASE_URL: &str = "ENRICH_BASE_URL";
pub const ENV_STORE_DIR: &str = "STORE_DIR";
pub const ENV_INGEST_CONCURRENCY: &str = "INGEST_CONCURRENCY";
pub const ENV_SOURCE_PARALLELISM: &str = "SOURCE_PARALLELISM";
pub const ENV_INGEST_INTERVAL_SECS: &str = "INGEST_INTERVAL_SECS";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "HTTP_TIMEOUT_SECS";
pub const ENV_INGEST_SLIM_ARTICLES: &str = "INGEST_SLIM_ARTICLES";
pub const ENV_BIND_ADDR: &str = "BIND_ADDR";

pub const DEFAULT_NEWS_API_BASE_URL: &str = "https://newsapi.org/v1";
pub const DEFAULT_ENRICH_BASE_URL: &str = "http://localhost:8081";
pub const DEFAULT_STORE_DIR: &str = "data";
pub const DEFAULT_INGEST_CONCURRENCY: usize = 5;
pub const DEFAULT_SOURCE_PARALLELISM: usize = 4;
pub const DEFAULT_INGEST_INTERVAL_SECS: u64 = 3600;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub news_api_base_url: String,
    pub news_api_key: String,
    pub enrich_base_url: String,
    pub store_dir: PathBuf,
    /// Global cap on concurrent enrichment tasks across all sources.
    pub ingest_concurrency: usize,
    /// How many sources are fetched at once.
    pub source_parallelism: usize,
    pub ingest_interval_secs: u64,
    pub http_timeout_secs: u64,
    pub slim_articles: bool,
    pub bind_addr: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            news_api_base_url: DEFAULT_NEWS_API_BASE_URL.to_string(),
            news_api_key: String::new(),
            enrich_base_url: DEFAULT_ENRICH_BASE_URL.to_string(),
            store_dir: PathBuf::from(DEFAULT_STORE_DIR),
            ingest_concurrency: DEFAULT_INGEST_CONCURRENCY,
            source_parallelism: DEFAULT_SOURCE_PARALLELISM,
            ingest_interval_secs: DEFAULT_INGEST_INTERVAL_SECS,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            slim_articles: false,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            news_api_base_url: env_string(ENV_NEWS_API_BASE_URL, d.news_api_base_url),
            news_api_key: env_string(ENV_NEWS_API_KEY, d.news_api_key),
            enrich_base_url: env_string(ENV_ENRICH_BASE_URL, d.enrich_base_url),
            store_dir: std::env::var(ENV_STORE_DIR)
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(d.store_dir),
            ingest_concurrency: env_parse(ENV_INGEST_CONCURRENCY, d.ingest_concurrency).max(1),
            source_parallelism: env_parse(ENV_SOURCE_PARALLELISM, d.source_parallelism).max(1),
            ingest_interval_secs: env_parse(ENV_INGEST_INTERVAL_SECS, d.ingest_interval_secs)
                .max(1),
            http_timeout_secs: env_parse(ENV_HTTP_TIMEOUT_SECS, d.http_timeout_secs).max(1),
            slim_articles: env_flag(ENV_INGEST_SLIM_ARTICLES),
            bind_addr: env_string(ENV_BIND_ADDR, d.bind_addr),
        }
    }
}

fn env_string(name: &str, default: String) -> String {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or(default)
}

fn env_parse<T: std::str::FromStr + std::fmt::Display + Copy>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(var = name, value = %raw, default = %default, "invalid value, using default");
                default
            }
        },
        Err(_) => default,
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}
