// src/rescore.rs
//! Source rescore: fold persisted article scores back into per-source
//! averages. Only reads articles; only writes source aggregate fields.

use anyhow::{Context, Result};
use futures::future::try_join_all;
use metrics::counter;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

use crate::model::Source;
use crate::store::{self, Filter, Store};

/// The two article fields the aggregate needs; tolerant of slim documents.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
struct ScoreRow {
    #[serde(default)]
    sentiment: f64,
    #[serde(default)]
    vocab: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RescoreReport {
    pub sources: usize,
    pub updated: usize,
}

/// Arithmetic means of (sentiment, vocab); `None` for an empty slice.
fn averages(rows: &[ScoreRow]) -> Option<(f64, f64)> {
    if rows.is_empty() {
        return None;
    }
    let n = rows.len() as f64;
    let (s, v) = rows
        .iter()
        .fold((0.0, 0.0), |(s, v), r| (s + r.sentiment, v + r.vocab));
    Some((s / n, v / n))
}

/// Recompute `sentimentAvg`/`vocabAvg` for every source that has articles.
/// Only those two fields are merged into a fresh read of each source, so a
/// catalog sync that lands mid-rescore keeps its metadata.
pub async fn rescore_all_sources(store: &dyn Store) -> Result<RescoreReport> {
    crate::metrics::ensure_described();
    let sources = store::all_sources(store)
        .await
        .context("loading sources")?;

    let per_source: Vec<Vec<ScoreRow>> = try_join_all(sources.iter().map(|s| async move {
        store::find_records::<ScoreRow>(store, store::ARTICLES, &Filter::eq("sourceId", s.id.as_str()))
            .await
            .with_context(|| format!("loading articles for source {}", s.id))
    }))
    .await?;

    let mut fresh_scores: HashMap<&str, (f64, f64)> = HashMap::new();
    for (source, rows) in sources.iter().zip(per_source.iter()) {
        match averages(rows) {
            Some(avg) => {
                fresh_scores.insert(source.id.as_str(), avg);
            }
            None => debug!(target: "rescore", source_id = %source.id, "no articles, scores untouched"),
        }
    }

    let mut updated: Vec<Source> = Vec::new();
    if !fresh_scores.is_empty() {
        for mut current in store::all_sources(store)
            .await
            .context("re-reading sources")?
        {
            if let Some(&(sentiment, vocab)) = fresh_scores.get(current.id.as_str()) {
                apply(&mut current, sentiment, vocab);
                updated.push(current);
            }
        }
    }

    if !updated.is_empty() {
        store::upsert_records(store, store::SOURCES, &updated)
            .await
            .context("persisting rescored sources")?;
    }
    counter!("rescore_sources_updated_total").increment(updated.len() as u64);
    info!(target: "rescore", sources = sources.len(), updated = updated.len(), "updated source scores");

    Ok(RescoreReport {
        sources: sources.len(),
        updated: updated.len(),
    })
}

fn apply(source: &mut Source, sentiment: f64, vocab: f64) {
    source.sentiment_avg = Some(sentiment);
    source.vocab_avg = Some(vocab);
}
