// src/catalog.rs
//! Source catalog synchronization: normalize the collaborator's listing into
//! canonical `Source` records and upsert them by id.

use anyhow::{Context, Result};
use metrics::counter;
use std::collections::HashMap;
use tracing::info;

use crate::enrich::NewsClient;
use crate::model::{RawSource, SortBy, Source};
use crate::store::{self, Store};

pub fn parse_raw_source(raw: RawSource) -> Source {
    let sort_capabilities = SortBy::ALL
        .into_iter()
        .filter(|mode| {
            raw.sort_bys_available
                .iter()
                .any(|s| s.trim().eq_ignore_ascii_case(mode.as_str()))
        })
        .collect();

    Source {
        id: raw.id,
        name: raw.name.unwrap_or_default(),
        description: raw.description.unwrap_or_default(),
        url: raw.url.unwrap_or_default(),
        category: raw.category.unwrap_or_default(),
        language: raw.language.unwrap_or_default(),
        country: raw.country.unwrap_or_default(),
        logos: raw.urls_to_logos,
        sort_capabilities,
        sentiment_avg: None,
        vocab_avg: None,
    }
}

/// Fetch the full listing and replace each stored source by id. Aggregate
/// scores already stored for a source are carried over. Returns the number
/// of sources written.
pub async fn sync_sources(client: &dyn NewsClient, store: &dyn Store) -> Result<usize> {
    crate::metrics::ensure_described();
    let raw = client
        .list_sources()
        .await
        .context("listing sources from collaborator")?;

    let existing: HashMap<String, Source> = store::all_sources(store)
        .await
        .context("loading stored sources")?
        .into_iter()
        .map(|s| (s.id.clone(), s))
        .collect();

    let sources: Vec<Source> = raw
        .into_iter()
        .filter(|r| !r.id.trim().is_empty())
        .map(parse_raw_source)
        .map(|mut s| {
            if let Some(prev) = existing.get(&s.id) {
                s.sentiment_avg = prev.sentiment_avg;
                s.vocab_avg = prev.vocab_avg;
            }
            s
        })
        .collect();

    info!(target: "catalog", count = sources.len(), "posting sources");
    let written = store::upsert_records(store, store::SOURCES, &sources)
        .await
        .context("persisting sources")?;
    counter!("catalog_sources_synced_total").increment(written as u64);
    Ok(written)
}
