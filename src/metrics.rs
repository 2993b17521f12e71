// src/metrics.rs
use anyhow::{Context, Result};
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up on /metrics).
pub fn ensure_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "ingest_candidates_total",
            "Raw candidates returned by the news collaborator."
        );
        describe_counter!(
            "ingest_filtered_total",
            "Candidates rejected by the keyword filter."
        );
        describe_counter!(
            "ingest_enrich_failures_total",
            "Candidates dropped because enrichment failed."
        );
        describe_counter!(
            "ingest_source_errors_total",
            "Sources whose candidate listing failed."
        );
        describe_counter!("ingest_articles_total", "Scored articles produced.");
        describe_histogram!("ingest_run_ms", "Ingest run duration in milliseconds.");
        describe_gauge!(
            "ingest_pipeline_last_run_ts",
            "Unix ts when the ingest pipeline last finished."
        );
        describe_counter!(
            "rescore_sources_updated_total",
            "Sources whose aggregate scores were recomputed."
        );
        describe_counter!(
            "catalog_sources_synced_total",
            "Sources written by catalog synchronization."
        );
    });
}

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder. Call once per process.
    pub fn init() -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;
        ensure_described();
        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
