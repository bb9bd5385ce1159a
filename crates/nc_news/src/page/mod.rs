use std::sync::Arc;
use std::time::Duration;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;
use nc_core::{Error, PageMetadata, Result};

pub mod jsonld;

/// Downloads article pages and pulls out what they say about themselves.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Arc<Client>,
}

impl PageFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("newscheck/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client: Arc::new(client),
        })
    }

    pub async fn fetch(&self, url: &str) -> Result<PageMetadata> {
        let url = utils::parse_url(url)?;
        let html = self.client
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let metadata = extract_metadata(&Html::parse_document(&html));
        debug!("🔎 Page metadata for {}: {:?}", url, metadata);
        Ok(metadata)
    }
}

/// Title and description of a page, preferring JSON-LD over `<title>` and meta tags.
pub fn extract_metadata(document: &Html) -> PageMetadata {
    let title = jsonld::extract_headline(document)
        .or_else(|| utils::extract_text(document, "title"))
        .or_else(|| utils::extract_attr(document, "meta[property='og:title']", "content"));
    let description = utils::extract_attr(document, "meta[name='description']", "content")
        .or_else(|| utils::extract_attr(document, "meta[property='og:description']", "content"))
        .or_else(|| jsonld::extract_description(document));
    PageMetadata { title, description }
}

pub(crate) mod utils {
    use super::*;

    pub fn parse_url(url: &str) -> Result<Url> {
        let parsed = Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))?;
        if matches!(parsed.scheme(), "http" | "https") {
            Ok(parsed)
        } else {
            Err(Error::InvalidUrl(format!("Unsupported scheme: {}", parsed.scheme())))
        }
    }

    pub fn extract_text(document: &Html, selector: &str) -> Option<String> {
        let selector = Selector::parse(selector).ok()?;
        document
            .select(&selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty())
    }

    pub fn extract_attr(document: &Html, selector: &str, attr: &str) -> Option<String> {
        let selector = Selector::parse(selector).ok()?;
        document
            .select(&selector)
            .next()
            .and_then(|el| el.value().attr(attr))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}
