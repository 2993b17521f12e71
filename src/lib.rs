// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod catalog;
pub mod config;
pub mod enrich;
pub mod identity;
pub mod ingest;
pub mod metrics;
pub mod model;
pub mod relevance;
pub mod rescore;
pub mod scoring;
pub mod sentiment;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::catalog::sync_sources;
pub use crate::identity::derive_id;
pub use crate::ingest::{Pipeline, RunPhase, RunReport, Shutdown};
pub use crate::model::{Article, Candidate, Source, SortBy};
pub use crate::relevance::KeywordFilter;
pub use crate::rescore::rescore_all_sources;
pub use crate::store::Store;
