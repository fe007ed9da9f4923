//! Finished mixtape download endpoint

use crate::error::{ApiError, ApiResult};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use uuid::Uuid;

/// GET /download/{job_id}
///
/// Streams the finished mp3 as an attachment. The id is parsed as a UUID so
/// the file lookup cannot be steered outside the output directory.
pub async fn download(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let job_id = Uuid::parse_str(&job_id)
        .map_err(|_| ApiError::BadRequest(format!("Not a job id: {job_id}")))?;

    let file_path = state.output_dir.join(format!("club100_{job_id}.mp3"));
    if !file_path.exists() {
        return Err(ApiError::NotFound(format!("No output for job {job_id}")));
    }

    let bytes = tokio::fs::read(&file_path).await?;
    let headers = [
        (header::CONTENT_TYPE, "audio/mpeg".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"club100_{job_id}.mp3\""),
        ),
    ];
    Ok((headers, bytes))
}
