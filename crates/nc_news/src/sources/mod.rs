use async_trait::async_trait;
use nc_core::{NewsSnippet, NewsSource, Result};

pub mod bing;

pub use bing::{BingConfig, BingNewsClient};

/// Serves a fixed list of snippets. An empty source stands in when no news API is configured.
#[derive(Debug, Clone, Default)]
pub struct StaticNewsSource {
    snippets: Vec<NewsSnippet>,
}

impl StaticNewsSource {
    pub fn new(snippets: Vec<NewsSnippet>) -> Self {
        Self { snippets }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NewsSource for StaticNewsSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch_snippets(&self, _query: &str, count: usize) -> Result<Vec<NewsSnippet>> {
        Ok(self.snippets.iter().take(count).cloned().collect())
    }
}
