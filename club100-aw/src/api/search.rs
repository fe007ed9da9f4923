//! Song search endpoint

use crate::error::{ApiError, ApiResult};
use crate::AppState;
use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: Option<String>,
}

/// POST /ytsearch — search for songs via the external downloader
pub async fn ytsearch(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> ApiResult<Json<Value>> {
    let query = request
        .query
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing query".to_string()))?;

    let results = state.youtube.search(&query).await?;
    Ok(Json(json!(results)))
}
