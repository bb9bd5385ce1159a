use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use nc_core::{Error, InferenceModel};
use std::sync::Arc;
use crate::AppState;

pub mod analyze;
pub mod blog;
pub mod chat;

pub use analyze::{analyze, analyze_claim, AnalyzeRequest};
pub use blog::{create_post, delete_post, list_posts};
pub use chat::chat;

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub async fn method_not_allowed() -> impl IntoResponse {
    (StatusCode::METHOD_NOT_ALLOWED, Json(json!({ "error": "Method not allowed" })))
}

fn require_model(state: &AppState) -> Result<&Arc<dyn InferenceModel>, Error> {
    state
        .inference_model
        .as_ref()
        .ok_or_else(|| Error::MissingConfig("GEMINI_API_KEY".to_string()))
}
