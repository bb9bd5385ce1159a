use std::sync::Arc;
use nc_core::{BlogStorage, ImageStore, InferenceModel, NewsSource};
use nc_news::PageFetcher;

/// Collaborators shared by all handlers, created once at start-up.
pub struct AppState {
    /// `None` when no model credentials were configured
    pub inference_model: Option<Arc<dyn InferenceModel>>,
    pub news_source: Arc<dyn NewsSource>,
    /// Enables page metadata lookups for analyzed URLs
    pub page_fetcher: Option<PageFetcher>,
    pub blog_storage: Arc<dyn BlogStorage>,
    pub image_store: Arc<dyn ImageStore>,
}
