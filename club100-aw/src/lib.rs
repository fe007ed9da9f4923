//! club100-aw - Mixtape Audio Worker
//!
//! Assembles a single mp3 from a timeline of heterogeneous audio sources:
//! downloaded song windows, synthesized or uploaded snippets, and bundled
//! sound effects. Acquisition and processing fan out concurrently; the
//! output order is reconstructed from timeline indices at assembly time.

pub mod api;
pub mod catalog;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use crate::catalog::EffectCatalog;
use crate::services::{MediaCache, MixtapePipeline, YoutubeClient};
use axum::{
    routing::{get, post},
    Router,
};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub catalog: Arc<EffectCatalog>,
    pub pipeline: Arc<MixtapePipeline>,
    pub youtube: YoutubeClient,
    pub cache: MediaCache,
    pub output_dir: PathBuf,
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(api::health::health_check))
        .route("/generate", post(api::generate::generate))
        .route("/effects", get(api::effects::list_effects))
        .route("/effects/:effect_id", get(api::effects::effect_file))
        .route("/effects/:effect_id/data", get(api::effects::effect_data))
        .route("/jobs", get(api::jobs::jobs))
        .route("/download/:job_id", get(api::download::download))
        .route("/ytsearch", post(api::search::ytsearch))
        .route("/cache/clear", post(api::cache::clear_cache))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
