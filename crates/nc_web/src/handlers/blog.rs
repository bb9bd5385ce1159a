use axum::extract::multipart::{Field, MultipartError, MultipartRejection};
use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};
use nc_core::{BlogPost, ImageUpload, PostForm};
use crate::error::ApiError;
use crate::AppState;

/// Multipart field carrying the optional post image.
pub const IMAGE_FIELD: &str = "uploadimage";
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

pub async fn list_posts(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let posts = state.blog_storage.list_posts().await.map_err(|e| {
        error!("❌ Failed to fetch posts: {}", e);
        ApiError::internal("Failed to fetch posts")
    })?;
    Ok(Json(json!({ "posts": posts })))
}

pub async fn create_post(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let mut multipart = multipart.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let mut form = PostForm::default();
    let mut image = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => form.title = Some(read_text(field).await?),
            "date" => form.date = Some(read_text(field).await?),
            "content" => form.content = Some(read_text(field).await?),
            IMAGE_FIELD => image = read_image(field).await?,
            _ => {}
        }
    }

    let post = form.validate()?;

    let uploaded = match image {
        Some(image) => Some(state.image_store.upload(image).await.map_err(|e| {
            error!("❌ Image upload error: {}", e);
            ApiError::internal("Failed to upload image")
        })?),
        None => None,
    };

    let post = BlogPost::new(post, uploaded);
    state.blog_storage.create_post(&post).await.map_err(|e| {
        error!("❌ Post creation error: {}", e);
        ApiError::internal("Failed to create post")
    })?;

    info!("📝 Created post {} ({})", post.id, post.title);
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Post created successfully", "post": post })),
    ))
}

async fn read_text(field: Field<'_>) -> Result<String, ApiError> {
    field.text().await.map_err(multipart_error)
}

/// Hitting the request body limit means the upload was too big.
fn multipart_error(error: MultipartError) -> ApiError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::bad_request("File too large")
    } else {
        ApiError::bad_request(error.body_text())
    }
}

/// File parts without a filename are what browsers send for an empty file input.
async fn read_image(field: Field<'_>) -> Result<Option<ImageUpload>, ApiError> {
    let filename = match field.file_name() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => return Ok(None),
    };
    let content_type = field.content_type().unwrap_or_default().to_string();
    if !content_type.starts_with("image/") {
        return Err(ApiError::bad_request("Only image files are allowed"));
    }

    let bytes = field.bytes().await.map_err(multipart_error)?;
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(ApiError::bad_request("File too large"));
    }

    Ok(Some(ImageUpload {
        filename,
        content_type,
        bytes: bytes.to_vec(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    pub id: Option<String>,
}

pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DeleteParams>,
) -> Result<impl IntoResponse, ApiError> {
    let id = params
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::bad_request("Post ID is required"))?;

    let post = state.blog_storage.get_post(&id).await.map_err(|e| {
        error!("❌ Delete error: {}", e);
        ApiError::internal("Failed to delete post")
    })?;
    let post = post.ok_or_else(|| ApiError::not_found("Post not found"))?;

    if let Some(public_id) = &post.image_public_id {
        if let Err(e) = state.image_store.destroy(public_id).await {
            warn!("⚠️ Failed to delete image {}: {}", public_id, e);
        }
    }

    state.blog_storage.delete_post(&id).await.map_err(|e| {
        error!("❌ Delete error: {}", e);
        ApiError::internal("Failed to delete post")
    })?;

    info!("🗑️ Deleted post {}", id);
    Ok(Json(json!({ "message": "Post deleted successfully" })))
}
