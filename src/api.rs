// src/api.rs
//! Thin HTTP surface over the pipeline. Handlers only read the cache, derive
//! scores, or trigger a cycle; all pipeline logic lives elsewhere.
//! Admin-session authentication is handled by the deployment edge, not here.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::aggregate;
use crate::article::Article;
use crate::category::Category;
use crate::scheduler::Pipeline;
use crate::stats::StatsSnapshot;

#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<Pipeline>,
}

pub fn create_router(pipeline: Arc<Pipeline>) -> Router {
    let state = AppState { pipeline };
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/news", get(all_news))
        .route("/api/news/{category}", get(category_news))
        .route("/api/category-scores", get(category_scores))
        .route("/api/index", get(index_score))
        .route("/api/admin/stats", get(admin_stats))
        .route("/api/admin/refresh-feeds", post(refresh_feeds))
        .route("/api/admin/reset-stats", post(reset_stats))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn all_news(State(state): State<AppState>) -> Json<HashMap<Category, Vec<Article>>> {
    Json(state.pipeline.cache.snapshot())
}

async fn category_news(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Vec<Article>>, StatusCode> {
    match Category::from_key(&category) {
        Some(c) => Ok(Json(state.pipeline.cache.category(c))),
        None => Err(StatusCode::NOT_FOUND),
    }
}

async fn category_scores(State(state): State<AppState>) -> Json<HashMap<Category, f64>> {
    Json(aggregate::scores_by_category(&state.pipeline.cache))
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct IndexResponse {
    overall_score: f64,
    categories: HashMap<Category, f64>,
}

async fn index_score(State(state): State<AppState>) -> Json<IndexResponse> {
    let categories = aggregate::scores_by_category(&state.pipeline.cache);
    Json(IndexResponse {
        overall_score: aggregate::overall_index(&categories),
        categories,
    })
}

async fn admin_stats(State(state): State<AppState>) -> Json<StatsSnapshot> {
    Json(state.pipeline.stats.snapshot())
}

/// Admin trigger: identical in effect to a scheduled cycle, and just as
/// tolerant of individual feed failures.
async fn refresh_feeds(State(state): State<AppState>) -> Json<serde_json::Value> {
    state.pipeline.run_cycle().await;
    Json(json!({ "message": "RSS feeds refreshed successfully" }))
}

async fn reset_stats(State(state): State<AppState>) -> Json<serde_json::Value> {
    state.pipeline.stats.reset();
    Json(json!({ "message": "Statistics reset" }))
}
