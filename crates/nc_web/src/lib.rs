use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};

pub mod error;
pub mod handlers;
pub mod logging;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

/// Request body ceiling: the largest accepted image plus room for the form fields.
pub const MAX_BODY_BYTES: usize = handlers::blog::MAX_IMAGE_BYTES + 1024 * 1024;

pub fn create_app(state: AppState, static_dir: Option<&Path>) -> Router {
    let cors = CorsLayer::permissive();

    let api = Router::new()
        .route(
            "/api/analyze",
            post(handlers::analyze).fallback(handlers::method_not_allowed),
        )
        .route(
            "/api/gemini-chat",
            post(handlers::chat).fallback(handlers::method_not_allowed),
        )
        .route(
            "/api/blog",
            get(handlers::list_posts)
                .post(handlers::create_post)
                .delete(handlers::delete_post)
                .fallback(handlers::method_not_allowed),
        )
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(Arc::new(state));

    let app = match static_dir {
        Some(dir) => with_static_files(api, dir),
        None => api,
    };
    app.layer(cors)
}

/// Serves the front-end pages from `dir`, with `landing.html` as the site root when present.
fn with_static_files(router: Router, dir: &Path) -> Router {
    let landing = dir.join("landing.html");
    let router = if landing.is_file() {
        router.route_service("/", ServeFile::new(landing))
    } else {
        router
    };
    router.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true))
}

pub mod prelude {
    pub use nc_core::{Error, Result, Verdict};
    pub use crate::{create_app, ApiError, AppState};
}
