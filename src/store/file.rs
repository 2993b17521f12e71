// src/store/file.rs
//! File-backed gateway: one JSON object (`id` → document) per collection in
//! `<dir>/<collection>.json`. Writes go to a temp file and are renamed into place.

use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use super::{doc_id, Filter, Store};

pub struct FileStore {
    dir: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileStore {
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("creating store dir {}", dir.display()))?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn collection_path(&self, collection: &str) -> PathBuf {
        self.dir.join(format!("{collection}.json"))
    }

    async fn load(&self, collection: &str) -> Result<BTreeMap<String, Value>> {
        let path = self.collection_path(collection);
        match tokio::fs::read_to_string(&path).await {
            Ok(s) if s.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(s) => serde_json::from_str(&s)
                .with_context(|| format!("parsing collection file {}", path.display())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
        }
    }

    async fn save(&self, collection: &str, docs: &BTreeMap<String, Value>) -> Result<()> {
        let path = self.collection_path(collection);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_vec_pretty(docs).context("serializing collection")?;
        tokio::fs::write(&tmp, json)
            .await
            .with_context(|| format!("writing {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("renaming into {}", path.display()))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Store for FileStore {
    async fn upsert_many(&self, collection: &str, docs: Vec<Value>) -> Result<usize> {
        let keyed = docs
            .into_iter()
            .map(|d| doc_id(&d).map(|id| (id, d)))
            .collect::<Result<Vec<_>>>()?;
        let _guard = self.write_lock.lock().await;
        let mut current = self.load(collection).await?;
        let n = keyed.len();
        for (id, doc) in keyed {
            current.insert(id, doc);
        }
        self.save(collection, &current).await?;
        tracing::debug!(target: "store", collection, written = n, "upserted documents");
        Ok(n)
    }

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Value>> {
        Ok(self
            .load(collection)
            .await?
            .into_values()
            .filter(|d| filter.matches(d))
            .collect())
    }
}
