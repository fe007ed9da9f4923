//! Job listing endpoint

use crate::db::jobs::list_jobs;
use crate::error::ApiResult;
use crate::AppState;
use axum::{extract::State, Json};
use serde_json::{json, Value};

/// GET /jobs — all recorded jobs, newest first
pub async fn jobs(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let jobs = list_jobs(&state.db).await?;
    let rows: Vec<Value> = jobs
        .iter()
        .map(|j| {
            json!({
                "id": j.id.to_string(),
                "created_at": j.created_at.to_rfc3339(),
                "status": j.status,
                "output_path": j.output_path,
            })
        })
        .collect();
    Ok(Json(json!(rows)))
}
