//! Cache maintenance endpoint

use crate::error::ApiResult;
use crate::AppState;
use axum::{extract::State, Json};
use serde_json::{json, Value};
use tracing::info;

/// POST /cache/clear — wipe the download cache
pub async fn clear_cache(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let removed = state.cache.clear()?;
    info!(removed, "Cache cleared by request");
    Ok(Json(json!({ "status": "cache cleared", "removed": removed })))
}
