// src/ingest/scheduler.rs
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use super::{Pipeline, Shutdown};
use crate::store::Store;

#[derive(Clone, Copy, Debug)]
pub struct IngestSchedulerCfg {
    pub interval_secs: u64,
}

/// Run `Pipeline::run_once` every `interval_secs` until `shutdown` fires.
/// The first run starts immediately; a failed run is logged and the loop continues.
pub fn spawn_scheduler(
    cfg: IngestSchedulerCfg,
    pipeline: Arc<Pipeline>,
    store: Arc<dyn Store>,
    shutdown: Shutdown,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(cfg.interval_secs.max(1)));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let mut runs: u64 = 0;
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }

            runs += 1;
            match pipeline.run_once(store.as_ref(), &shutdown).await {
                Ok(report) => tracing::info!(
                    target: "ingest",
                    run = runs,
                    persisted = report.persisted,
                    failures = report.failures,
                    "scheduled ingest tick"
                ),
                Err(e) => tracing::error!(
                    target: "ingest",
                    run = runs,
                    error = %format!("{e:#}"),
                    "scheduled ingest failed"
                ),
            }
        }
        tracing::info!(target: "ingest", runs, "scheduler stopped");
    })
}
