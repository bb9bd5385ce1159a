use std::sync::Arc;
use async_trait::async_trait;
use tracing::info;
use nc_core::{BlogStorage, Error, Result};

pub mod backends;
pub mod images;

pub use backends::*;
pub use images::{CloudinaryConfig, CloudinaryImageStore, MemoryImageStore};

#[async_trait]
pub trait StorageBackend: BlogStorage + Sized {
    fn get_error_message() -> &'static str;

    /// Open the backend, using its default location when `url` is `None`
    async fn connect(url: Option<&str>) -> Result<Self>;
}

/// Opens the blog storage named by `kind` (`memory` or `sqlite`).
pub async fn create_storage(kind: &str, url: Option<&str>) -> Result<Arc<dyn BlogStorage>> {
    let storage: Arc<dyn BlogStorage> = match kind {
        "memory" => Arc::new(open::<MemoryBlogStorage>(url).await?),
        #[cfg(feature = "sqlite")]
        "sqlite" => Arc::new(open::<SqliteBlogStorage>(url).await?),
        other => {
            return Err(Error::Storage(format!(
                "Unsupported storage backend: {}",
                other
            )))
        }
    };
    info!("🏦 Blog storage initialized (using {})", kind);
    Ok(storage)
}

async fn open<T: StorageBackend>(url: Option<&str>) -> Result<T> {
    T::connect(url)
        .await
        .map_err(|e| Error::Storage(format!("{} ({})", T::get_error_message(), e)))
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::images::*;
    pub use super::{create_storage, StorageBackend};
}
