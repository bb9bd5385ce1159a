pub mod page;
pub mod sources;

pub use page::PageFetcher;
pub use sources::{BingConfig, BingNewsClient, StaticNewsSource};

/// Number of snippets requested per analysis.
pub const DEFAULT_SNIPPET_COUNT: usize = 3;

pub mod prelude {
    pub use super::page::{extract_metadata, PageFetcher};
    pub use super::sources::{BingNewsClient, StaticNewsSource};
    pub use nc_core::{Error, NewsSnippet, NewsSource, PageMetadata, Result};
}
