// src/ingest/mod.rs
//! Ingestion pipeline: fetch latest candidates per source, keyword-filter,
//! enrich under one shared concurrency bound, score, assign ids, persist.
//!
//! A run moves through `RunPhase`s in order; each stage completes for all
//! sources before the next starts, so the enrichment pool is shared by every
//! source's candidates. Per-source and per-candidate failures are logged and
//! dropped; only source loading and persistence fail a run.

pub mod scheduler;
pub mod shutdown;

use anyhow::{bail, Context, Result};
use futures::stream::{self, StreamExt};
use metrics::{counter, gauge, histogram};
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::config::AppConfig;
use crate::enrich::{enrich_candidate, NewsClient};
use crate::identity::derive_id;
use crate::model::{Article, Candidate, DraftArticle, SortBy, Source};
use crate::relevance::{KeywordFilter, Verdict};
use crate::scoring::score_content;
use crate::store::{self, Store};

pub use shutdown::Shutdown;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    FetchingSources,
    FetchingCandidates,
    Filtering,
    Enriching,
    Scoring,
    Persisting,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunPhase::Idle => "idle",
            RunPhase::FetchingSources => "fetching_sources",
            RunPhase::FetchingCandidates => "fetching_candidates",
            RunPhase::Filtering => "filtering",
            RunPhase::Enriching => "enriching",
            RunPhase::Scoring => "scoring",
            RunPhase::Persisting => "persisting",
        };
        f.write_str(s)
    }
}

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub sources: usize,
    /// Sources without the `latest` capability.
    pub skipped_sources: usize,
    pub source_errors: usize,
    pub candidates: usize,
    pub relevant: usize,
    pub failures: usize,
    pub articles: usize,
    pub persisted: usize,
    pub cancelled: bool,
}

pub struct Pipeline {
    client: Arc<dyn NewsClient>,
    filter: Arc<KeywordFilter>,
    permits: Arc<Semaphore>,
    source_parallelism: usize,
    slim_articles: bool,
    phase: Mutex<RunPhase>,
}

impl Pipeline {
    /// `concurrency` caps enrichment tasks across all sources (min 1).
    pub fn new(client: Arc<dyn NewsClient>, filter: KeywordFilter, concurrency: usize) -> Self {
        Self {
            client,
            filter: Arc::new(filter),
            permits: Arc::new(Semaphore::new(concurrency.max(1))),
            source_parallelism: crate::config::DEFAULT_SOURCE_PARALLELISM,
            slim_articles: false,
            phase: Mutex::new(RunPhase::Idle),
        }
    }

    pub fn from_config(client: Arc<dyn NewsClient>, filter: KeywordFilter, cfg: &AppConfig) -> Self {
        Self::new(client, filter, cfg.ingest_concurrency)
            .with_source_parallelism(cfg.source_parallelism)
            .with_slim_articles(cfg.slim_articles)
    }

    pub fn with_source_parallelism(mut self, n: usize) -> Self {
        self.source_parallelism = n.max(1);
        self
    }

    pub fn with_slim_articles(mut self, slim: bool) -> Self {
        self.slim_articles = slim;
        self
    }

    pub fn phase(&self) -> RunPhase {
        self.phase.lock().map(|p| *p).unwrap_or(RunPhase::Idle)
    }

    fn set_phase(&self, next: RunPhase) {
        if let Ok(mut p) = self.phase.lock() {
            *p = next;
        }
        debug!(target: "ingest", phase = %next, "phase");
    }

    /// Produce scored articles for every source that supports `latest`.
    /// Never fails as a whole; failed sources and candidates contribute nothing.
    pub async fn ingest_all(&self, sources: &[Source], shutdown: &Shutdown) -> Vec<Article> {
        self.ingest_all_reported(sources, shutdown).await.0
    }

    pub async fn ingest_all_reported(
        &self,
        sources: &[Source],
        shutdown: &Shutdown,
    ) -> (Vec<Article>, RunReport) {
        crate::metrics::ensure_described();
        let mut report = RunReport {
            sources: sources.len(),
            ..Default::default()
        };

        // 1) Latest candidates per eligible source
        self.set_phase(RunPhase::FetchingCandidates);
        let eligible: Vec<&Source> = sources
            .iter()
            .filter(|s| s.supports(SortBy::Latest))
            .collect();
        report.skipped_sources = sources.len() - eligible.len();

        let fetches: Vec<_> = eligible
            .into_iter()
            .map(|source| async move {
                let fetched = tokio::select! {
                    _ = shutdown.cancelled() => Err(anyhow::anyhow!("cancelled")),
                    r = self.client.get_latest(&source.id) => r,
                };
                (source, fetched)
            })
            .collect();
        let listings: Vec<(&Source, Result<Vec<Candidate>>)> = stream::iter(fetches)
            .buffer_unordered(self.source_parallelism)
            .collect()
            .await;

        // 2) Keyword relevance, before any enrichment call
        self.set_phase(RunPhase::Filtering);
        let mut accepted: Vec<(&Source, Candidate)> = Vec::new();
        for (source, fetched) in listings {
            let candidates = match fetched {
                Ok(c) => c,
                Err(e) => {
                    if !shutdown.is_triggered() {
                        warn!(target: "ingest", source_id = %source.id, error = %format!("{e:#}"), "latest listing failed");
                        counter!("ingest_source_errors_total").increment(1);
                        report.source_errors += 1;
                    }
                    continue;
                }
            };
            report.candidates += candidates.len();
            counter!("ingest_candidates_total").increment(candidates.len() as u64);
            for c in candidates {
                match self.filter.check_candidate(&c) {
                    Verdict::Relevant(_) => accepted.push((source, c)),
                    verdict => {
                        debug!(target: "ingest", source_id = %source.id, url = c.url.as_deref().unwrap_or(""), ?verdict, "candidate rejected");
                        counter!("ingest_filtered_total").increment(1);
                    }
                }
            }
        }
        report.relevant = accepted.len();

        // 3) Enrichment under the shared pool; one task per candidate so a
        // panicking collaborator call only loses that candidate.
        self.set_phase(RunPhase::Enriching);
        let mut tasks = JoinSet::new();
        for (idx, (source, c)) in accepted.iter().enumerate() {
            let client = Arc::clone(&self.client);
            let permits = Arc::clone(&self.permits);
            let shutdown = shutdown.clone();
            let source = (*source).clone();
            let candidate = c.clone();
            tasks.spawn(async move {
                let r = enrich_guarded(client.as_ref(), &permits, &source, &candidate, &shutdown).await;
                (idx, r)
            });
        }

        let mut drafts = Vec::with_capacity(accepted.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(d))) => drafts.push(d),
                Ok((idx, Err(e))) => {
                    report.failures += 1;
                    if !shutdown.is_triggered() {
                        let (source, c) = &accepted[idx];
                        warn!(target: "ingest", source_id = %source.id, url = c.url.as_deref().unwrap_or(""), error = %format!("{e:#}"), "enrichment failed");
                        counter!("ingest_enrich_failures_total").increment(1);
                    }
                }
                Err(e) => {
                    report.failures += 1;
                    error!(target: "ingest", error = %e, "enrichment task panicked");
                    counter!("ingest_enrich_failures_total").increment(1);
                }
            }
        }

        // 4) Scores + content-addressed ids
        self.set_phase(RunPhase::Scoring);
        let articles: Vec<Article> = drafts.into_iter().map(materialize).collect();
        report.articles = articles.len();
        report.cancelled = shutdown.is_triggered();
        counter!("ingest_articles_total").increment(articles.len() as u64);

        (articles, report)
    }

    /// Load sources, ingest, persist. Errors only on store failures.
    pub async fn run_once(&self, store: &dyn Store, shutdown: &Shutdown) -> Result<RunReport> {
        let t0 = std::time::Instant::now();
        let res = self.run_once_inner(store, shutdown).await;
        self.set_phase(RunPhase::Idle);

        histogram!("ingest_run_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        if let Ok(report) = &res {
            gauge!("ingest_pipeline_last_run_ts").set(chrono::Utc::now().timestamp() as f64);
            info!(
                target: "ingest",
                sources = report.sources,
                skipped = report.skipped_sources,
                candidates = report.candidates,
                relevant = report.relevant,
                failures = report.failures,
                persisted = report.persisted,
                cancelled = report.cancelled,
                "ingest run finished"
            );
        }
        res
    }

    async fn run_once_inner(&self, store: &dyn Store, shutdown: &Shutdown) -> Result<RunReport> {
        self.set_phase(RunPhase::FetchingSources);
        info!(target: "ingest", client = self.client.name(), "starting latest-articles ingest");
        let sources = store::all_sources(store)
            .await
            .context("loading sources")?;

        let (articles, mut report) = self.ingest_all_reported(&sources, shutdown).await;

        self.set_phase(RunPhase::Persisting);
        if !articles.is_empty() {
            let to_store: Vec<Article> = if self.slim_articles {
                articles.into_iter().map(Article::slimmed).collect()
            } else {
                articles
            };
            report.persisted = store::upsert_records(store, store::ARTICLES, &to_store)
                .await
                .context("persisting articles")?;
        }
        Ok(report)
    }
}

async fn enrich_guarded(
    client: &dyn NewsClient,
    permits: &Semaphore,
    source: &Source,
    candidate: &Candidate,
    shutdown: &Shutdown,
) -> Result<DraftArticle> {
    let _permit = tokio::select! {
        _ = shutdown.cancelled() => bail!("cancelled before enrichment"),
        p = permits.acquire() => p.context("enrichment pool closed")?,
    };
    tokio::select! {
        _ = shutdown.cancelled() => bail!("cancelled during enrichment"),
        r = enrich_candidate(client, source, candidate) => r,
    }
}

/// Score a draft and give it its id.
pub fn materialize(draft: DraftArticle) -> Article {
    let scores = score_content(&draft.content);
    let id = derive_id(&draft.source_url);
    Article::from_draft(draft, id, scores.sentiment, scores.vocab)
}
