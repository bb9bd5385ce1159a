use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use futures::future::join;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};
use nc_core::coerce::lenient_option;
use nc_core::{ChatRequest, Error, NewsSnippet, PageMetadata, Result, Verdict};
use nc_inference::{build_prompt, normalize};
use nc_news::DEFAULT_SNIPPET_COUNT;
use crate::error::ApiError;
use crate::AppState;
use super::require_model;

/// Falsy `url` or `text` values count as absent; other values are stringified.
#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default, deserialize_with = "lenient_option")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient_option")]
    pub text: Option<String>,
}

pub async fn analyze(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<AnalyzeRequest>, JsonRejection>,
) -> std::result::Result<Json<Verdict>, ApiError> {
    let request = payload.map(|Json(r)| r).unwrap_or_default();
    let verdict = analyze_claim(&state, request).await?;
    Ok(Json(verdict))
}

/// Gathers news and page context for a claim, asks the model, and normalizes its answer.
pub async fn analyze_claim(state: &AppState, request: AnalyzeRequest) -> Result<Verdict> {
    let model = require_model(state)?;

    let url = request.url.filter(|u| !u.is_empty());
    let text = request.text.filter(|t| !t.is_empty());
    if url.is_none() && text.is_none() {
        return Err(Error::Validation("Provide text or url".to_string()));
    }

    let query = text.as_deref().or(url.as_deref()).unwrap_or_default();
    let page = async {
        match (&state.page_fetcher, &url) {
            (Some(fetcher), Some(url)) => fetch_page(fetcher, url).await,
            _ => None,
        }
    };
    let (snippets, page) = join(fetch_snippets(state, query), page).await;

    let prompt = build_prompt(url.as_deref(), text.as_deref(), &snippets, page.as_ref());
    let completion = model.generate(&ChatRequest::single(prompt)).await?;
    let verdict = normalize(&completion.text);

    info!(
        "🔍 Analysis complete: {} ({:.2}) with {} news snippet(s)",
        verdict.verdict,
        verdict.confidence,
        snippets.len()
    );
    Ok(verdict)
}

/// News context is optional: any failure means no snippets.
async fn fetch_snippets(state: &AppState, query: &str) -> Vec<NewsSnippet> {
    match state.news_source.fetch_snippets(query, DEFAULT_SNIPPET_COUNT).await {
        Ok(snippets) => snippets,
        Err(e) => {
            warn!("⚠️ {} unavailable, continuing without news: {}", state.news_source.name(), e);
            Vec::new()
        }
    }
}

async fn fetch_page(fetcher: &nc_news::PageFetcher, url: &str) -> Option<PageMetadata> {
    match fetcher.fetch(url).await {
        Ok(page) => Some(page),
        Err(e) => {
            warn!("⚠️ Could not read {}: {}", url, e);
            None
        }
    }
}
