//! Effect catalog endpoints

use crate::error::{ApiError, ApiResult};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use base64::Engine;
use serde_json::{json, Value};

/// GET /effects — catalog listing
pub async fn list_effects(State(state): State<AppState>) -> Json<Value> {
    Json(json!(state.catalog.list()))
}

/// GET /effects/{filename} — raw effect audio, as linked from the listing
pub async fn effect_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> ApiResult<Response> {
    let effect = state
        .catalog
        .find_by_file(&filename)
        .ok_or_else(|| ApiError::NotFound(format!("Effect not found: {filename}")))?;

    let file_path = state.catalog.file_path(effect);
    let bytes = tokio::fs::read(&file_path)
        .await
        .map_err(|_| ApiError::NotFound(format!("Effect file not found: {}", effect.file)))?;

    Ok(([(header::CONTENT_TYPE, "audio/mpeg")], bytes).into_response())
}

/// GET /effects/{effect_id}/data — effect audio as a base64 data URL
pub async fn effect_data(
    State(state): State<AppState>,
    Path(effect_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let effect = state
        .catalog
        .get(&effect_id)
        .ok_or_else(|| ApiError::NotFound(format!("Effect not found: {effect_id}")))?;

    let file_path = state.catalog.file_path(effect);
    if !file_path.exists() {
        return Err(ApiError::NotFound(format!(
            "Effect file not found: {}",
            effect.file
        )));
    }

    let bytes = tokio::fs::read(&file_path).await?;
    let b64 = base64::engine::general_purpose::STANDARD.encode(&bytes);
    let mime = match file_path.extension().and_then(|e| e.to_str()) {
        Some("mp3") => "audio/mpeg",
        _ => "audio/wav",
    };
    Ok(Json(json!({ "dataUrl": format!("data:{mime};base64,{b64}") })))
}
