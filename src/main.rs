//! Operational entrypoint: one-shot ingest / rescore / catalog sync, a
//! periodic ingest loop, and the read-only HTTP server.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use news_sentiment_pipeline::{
    api,
    config::AppConfig,
    enrich::{http::HttpNewsClient, NewsClient},
    ingest::scheduler::{spawn_scheduler, IngestSchedulerCfg},
    metrics::Metrics,
    store::{file::FileStore, Store},
    KeywordFilter, Pipeline, Shutdown,
};

#[derive(Parser)]
#[command(name = "news-pipeline", about = "News article acquisition and scoring pipeline")]
struct Cli {
    /// Directory of the file-backed store (overrides STORE_DIR)
    #[arg(long, env = "STORE_DIR")]
    store_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download, score and store the latest articles once
    Ingest,
    /// Recompute per-source average scores once
    Rescore,
    /// Refresh the source catalog from the news collaborator
    SyncSources,
    /// Ingest every INGEST_INTERVAL_SECS until Ctrl-C
    Schedule,
    /// Serve the read API (sources, articles, metrics)
    Serve {
        /// Also run the periodic ingest in this process
        #[arg(long)]
        with_scheduler: bool,
    },
}

/// Compact logs by default; `LOG_FORMAT=json` for structured output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

fn shutdown_on_ctrl_c() -> Shutdown {
    let shutdown = Shutdown::new();
    let s = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("ctrl-c received, cancelling");
            s.trigger();
        }
    });
    shutdown
}

fn build_pipeline(cfg: &AppConfig, client: Arc<dyn NewsClient>) -> Result<Pipeline> {
    let filter = KeywordFilter::load_default().context("loading keyword lists")?;
    tracing::info!(
        good = filter.good().len(),
        bad = filter.bad().len(),
        concurrency = cfg.ingest_concurrency,
        "keyword filter ready"
    );
    Ok(Pipeline::from_config(client, filter, cfg))
}

fn start_scheduler(
    cfg: &AppConfig,
    store: Arc<dyn Store>,
    shutdown: Shutdown,
) -> Result<tokio::task::JoinHandle<()>> {
    let client: Arc<dyn NewsClient> = Arc::new(HttpNewsClient::from_config(cfg)?);
    let pipeline = Arc::new(build_pipeline(cfg, client)?);
    Ok(spawn_scheduler(
        IngestSchedulerCfg {
            interval_secs: cfg.ingest_interval_secs,
        },
        pipeline,
        store,
        shutdown,
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    let mut cfg = AppConfig::from_env();
    if let Some(dir) = cli.store_dir {
        cfg.store_dir = dir;
    }

    let store: Arc<dyn Store> = Arc::new(FileStore::open(cfg.store_dir.clone()).await?);
    tracing::info!(store = %cfg.store_dir.display(), "store opened");

    match cli.command {
        Command::Ingest => {
            let client: Arc<dyn NewsClient> = Arc::new(HttpNewsClient::from_config(&cfg)?);
            let pipeline = build_pipeline(&cfg, client)?;
            let shutdown = shutdown_on_ctrl_c();
            let report = pipeline.run_once(store.as_ref(), &shutdown).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Rescore => {
            let report = news_sentiment_pipeline::rescore_all_sources(store.as_ref()).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::SyncSources => {
            let client = HttpNewsClient::from_config(&cfg)?;
            let n = news_sentiment_pipeline::sync_sources(&client, store.as_ref()).await?;
            println!("synced {n} sources");
        }
        Command::Schedule => {
            let shutdown = shutdown_on_ctrl_c();
            let handle = start_scheduler(&cfg, store, shutdown)?;
            handle.await.context("scheduler task")?;
        }
        Command::Serve { with_scheduler } => {
            let metrics = Metrics::init()?;
            let shutdown = shutdown_on_ctrl_c();
            let scheduler = if with_scheduler {
                Some(start_scheduler(&cfg, store.clone(), shutdown.clone())?)
            } else {
                None
            };

            let app = api::router(api::AppState { store }).merge(metrics.router());
            let listener = tokio::net::TcpListener::bind(&cfg.bind_addr)
                .await
                .with_context(|| format!("binding {}", cfg.bind_addr))?;
            tracing::info!(addr = %cfg.bind_addr, with_scheduler, "read API listening");
            let stop = shutdown.clone();
            axum::serve(listener, app)
                .with_graceful_shutdown(async move { stop.cancelled().await })
                .await
                .context("serving read API")?;

            if let Some(handle) = scheduler {
                handle.await.context("scheduler task")?;
            }
        }
    }

    Ok(())
}
