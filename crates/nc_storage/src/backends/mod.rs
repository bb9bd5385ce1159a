pub mod memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use memory::MemoryBlogStorage;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteBlogStorage;
