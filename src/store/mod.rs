// src/store/mod.rs
//! Persistence gateway: schemaless JSON documents keyed by `id`, grouped in
//! named collections. Writes are upserts; reads are equality filters.

pub mod file;
pub mod memory;

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::model::{Article, Source};

pub const SOURCES: &str = "sources";
pub const ARTICLES: &str = "articles";

/// Gateway contract. Implementations must tolerate concurrent callers; each
/// document write is independent.
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    /// Insert-or-replace each document by its `id`. Returns the number written.
    async fn upsert_many(&self, collection: &str, docs: Vec<Value>) -> Result<usize>;
    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Value>>;
}

/// Top-level field equality filter. An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    eq: Vec<(String, Value)>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::default().and_eq(field, value)
    }

    pub fn and_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.eq.push((field.into(), value.into()));
        self
    }

    pub fn matches(&self, doc: &Value) -> bool {
        self.eq
            .iter()
            .all(|(field, want)| doc.get(field.as_str()) == Some(want))
    }
}

/// `id` of a document, required for every write.
pub(crate) fn doc_id(doc: &Value) -> Result<String> {
    doc.get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .context("document is missing a string `id`")
}

pub async fn upsert_records<T: Serialize>(
    store: &dyn Store,
    collection: &str,
    records: &[T],
) -> Result<usize> {
    let docs = records
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("serializing {collection} records"))?;
    store.upsert_many(collection, docs).await
}

pub async fn find_records<T: DeserializeOwned>(
    store: &dyn Store,
    collection: &str,
    filter: &Filter,
) -> Result<Vec<T>> {
    store
        .find(collection, filter)
        .await?
        .into_iter()
        .map(|doc| {
            serde_json::from_value(doc).with_context(|| format!("decoding {collection} document"))
        })
        .collect()
}

/// Like `find_records`, but a document that does not decode is logged and
/// skipped instead of failing the whole read.
pub async fn find_decodable<T: DeserializeOwned>(
    store: &dyn Store,
    collection: &str,
    filter: &Filter,
) -> Result<Vec<T>> {
    let docs = store.find(collection, filter).await?;
    let mut out = Vec::with_capacity(docs.len());
    for doc in docs {
        let id = doc.get("id").and_then(Value::as_str).unwrap_or("").to_string();
        match serde_json::from_value(doc) {
            Ok(v) => out.push(v),
            Err(e) => tracing::warn!(
                target: "store",
                collection,
                id = %id,
                error = %e,
                "skipping undecodable document"
            ),
        }
    }
    Ok(out)
}

// ---- Read API (pass-through reads for the HTTP layer) ----

pub async fn all_sources(store: &dyn Store) -> Result<Vec<Source>> {
    find_decodable(store, SOURCES, &Filter::all()).await
}

pub async fn articles_by_source(store: &dyn Store, source_id: &str) -> Result<Vec<Article>> {
    find_decodable(store, ARTICLES, &Filter::eq("sourceId", source_id)).await
}
