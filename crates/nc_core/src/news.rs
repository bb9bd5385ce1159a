use async_trait::async_trait;
use crate::types::NewsSnippet;
use crate::Result;

#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Returns the name of the news provider
    fn name(&self) -> &str;

    /// Fetch up to `count` recent snippets matching `query`
    async fn fetch_snippets(&self, query: &str, count: usize) -> Result<Vec<NewsSnippet>>;
}
