// src/api.rs
//! Read-only HTTP surface over the store: pass-through reads, no business logic.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::store::{self, Store};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/sources", get(list_sources))
        .route("/articles", get(list_articles))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArticlesQuery {
    source_id: Option<String>,
}

async fn list_sources(State(state): State<AppState>) -> Response {
    match store::all_sources(state.store.as_ref()).await {
        Ok(sources) => Json(sources).into_response(),
        Err(e) => internal_error("sources", e),
    }
}

async fn list_articles(
    State(state): State<AppState>,
    Query(q): Query<ArticlesQuery>,
) -> Response {
    let Some(source_id) = q.source_id.filter(|s| !s.trim().is_empty()) else {
        return (StatusCode::BAD_REQUEST, "missing sourceId").into_response();
    };
    match store::articles_by_source(state.store.as_ref(), &source_id).await {
        Ok(articles) => Json(articles).into_response(),
        Err(e) => internal_error("articles", e),
    }
}

fn internal_error(what: &str, e: anyhow::Error) -> Response {
    tracing::error!(target: "api", error = %format!("{e:#}"), what, "read failed");
    (StatusCode::INTERNAL_SERVER_ERROR, "store error").into_response()
}
