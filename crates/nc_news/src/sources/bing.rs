use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;
use nc_core::{Error, NewsSnippet, NewsSource, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.bing.microsoft.com";

#[derive(Debug, Clone)]
pub struct BingConfig {
    pub api_key: String,
    pub base_url: String,
    pub market: String,
    pub timeout: Duration,
}

impl BingConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            market: "en-US".to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    value: Vec<NewsArticle>,
}

#[derive(Deserialize)]
struct NewsArticle {
    #[serde(default)]
    name: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    provider: Vec<Provider>,
}

#[derive(Deserialize)]
struct Provider {
    #[serde(default)]
    name: String,
}

impl From<NewsArticle> for NewsSnippet {
    fn from(article: NewsArticle) -> Self {
        NewsSnippet {
            name: article.name,
            url: article.url,
            description: article.description,
            provider: article
                .provider
                .into_iter()
                .next()
                .map(|p| p.name)
                .unwrap_or_default(),
        }
    }
}

/// Client for the Bing News Search v7 API.
pub struct BingNewsClient {
    client: Arc<Client>,
    config: BingConfig,
}

impl BingNewsClient {
    pub fn new(config: BingConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client: Arc::new(client),
            config,
        })
    }

    fn search_url(&self, query: &str, count: usize) -> Result<Url> {
        let mut url = Url::parse(&self.config.base_url)?.join("v7.0/news/search")?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("count", &count.to_string())
            .append_pair("mkt", &self.config.market)
            .append_pair("safeSearch", "Moderate");
        Ok(url)
    }
}

impl fmt::Debug for BingNewsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BingNewsClient")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.config.base_url)
            .finish()
    }
}

#[async_trait]
impl NewsSource for BingNewsClient {
    fn name(&self) -> &str {
        "Bing News"
    }

    async fn fetch_snippets(&self, query: &str, count: usize) -> Result<Vec<NewsSnippet>> {
        let response = self.client
            .get(self.search_url(query, count)?)
            .header("Ocp-Apim-Subscription-Key", &self.config.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::News(format!("Bing News API error: {}", response.status())));
        }

        let body = response.json::<SearchResponse>().await?;
        debug!("📰 Bing returned {} article(s)", body.value.len());
        Ok(body.value.into_iter().map(NewsSnippet::from).collect())
    }
}
