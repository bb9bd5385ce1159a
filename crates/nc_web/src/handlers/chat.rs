use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;
use nc_core::ChatRequest;
use crate::error::ApiError;
use crate::AppState;
use super::require_model;

pub async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let model = require_model(&state)?;

    let request = payload.map(|Json(r)| r).unwrap_or_default();
    if request.messages.is_empty() {
        return Err(ApiError::bad_request("messages must be a non-empty array"));
    }

    debug!(
        "💬 Chat request: {} message(s), model {:?}",
        request.messages.len(),
        request.model
    );
    let completion = model.generate(&request).await?;
    Ok(Json(json!({ "reply": completion.text, "raw": completion.raw })))
}
