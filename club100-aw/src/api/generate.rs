//! Mixtape generation endpoint

use crate::error::{ApiError, ApiResult};
use crate::models::timeline::{parse_items, GenerateRequest};
use crate::AppState;
use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub output: String,
    #[serde(rename = "jobId")]
    pub job_id: String,
}

/// POST /generate
///
/// Runs the whole pipeline inline and answers with the artifact path and job
/// id once assembly finishes.
pub async fn generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> ApiResult<Json<GenerateResponse>> {
    let values: Vec<Value> = request.resolve_timeline();
    let items = parse_items(&values);

    let job = state
        .pipeline
        .run(items, request.language.clone())
        .await
        .map_err(|e| match e.downcast::<club100_common::Error>() {
            Ok(common) => ApiError::Common(common),
            Err(other) => ApiError::Other(other),
        })?;

    let output = job.output_path.clone().ok_or_else(|| {
        ApiError::Internal("job finished without an output path".to_string())
    })?;
    Ok(Json(GenerateResponse {
        output,
        job_id: job.id.to_string(),
    }))
}
