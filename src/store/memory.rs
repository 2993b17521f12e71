// src/store/memory.rs
use anyhow::{anyhow, Result};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use super::{doc_id, Filter, Store};

/// In-process gateway. Documents per collection are kept ordered by id.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<HashMap<String, BTreeMap<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection.
    pub fn len(&self, collection: &str) -> usize {
        self.inner
            .read()
            .map(|g| g.get(collection).map_or(0, BTreeMap::len))
            .unwrap_or(0)
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }
}

#[async_trait::async_trait]
impl Store for MemoryStore {
    async fn upsert_many(&self, collection: &str, docs: Vec<Value>) -> Result<usize> {
        let keyed = docs
            .into_iter()
            .map(|d| doc_id(&d).map(|id| (id, d)))
            .collect::<Result<Vec<_>>>()?;
        let mut guard = self
            .inner
            .write()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        let coll = guard.entry(collection.to_string()).or_default();
        let n = keyed.len();
        for (id, doc) in keyed {
            coll.insert(id, doc);
        }
        Ok(n)
    }

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Value>> {
        let guard = self
            .inner
            .read()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        Ok(guard
            .get(collection)
            .map(|coll| {
                coll.values()
                    .filter(|d| filter.matches(d))
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn upsert_overwrites_by_id() {
        let s = MemoryStore::new();
        s.upsert_many("c", vec![json!({"id": "a", "v": 1})])
            .await
            .unwrap();
        s.upsert_many("c", vec![json!({"id": "a", "v": 2}), json!({"id": "b", "v": 3})])
            .await
            .unwrap();
        assert_eq!(s.len("c"), 2);
        let a = s.find("c", &Filter::eq("id", "a")).await.unwrap();
        assert_eq!(a, vec![json!({"id": "a", "v": 2})]);
    }

    #[tokio::test]
    async fn batch_with_missing_id_is_rejected_whole() {
        let s = MemoryStore::new();
        let err = s
            .upsert_many("c", vec![json!({"id": "a"}), json!({"v": 1})])
            .await;
        assert!(err.is_err());
        assert!(s.is_empty("c"));
    }

    #[tokio::test]
    async fn find_on_unknown_collection_is_empty() {
        let s = MemoryStore::new();
        assert!(s.find("nope", &Filter::all()).await.unwrap().is_empty());
    }
}
