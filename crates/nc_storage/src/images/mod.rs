use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use nc_core::{Error, ImageStore, ImageUpload, Result, UploadedImage};

pub mod cloudinary;

pub use cloudinary::{CloudinaryConfig, CloudinaryImageStore};

pub const DEFAULT_FOLDER: &str = "blog_images";

/// Public id for a new upload: `{folder}/{unix_millis}_{filename}`.
pub fn public_id(folder: &str, filename: &str) -> String {
    let filename: String = filename
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    format!("{}/{}_{}", folder, Utc::now().timestamp_millis(), filename)
}

/// Image store backed by process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryImageStore {
    images: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, public_id: &str) -> bool {
        self.images.read().await.contains_key(public_id)
    }
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    async fn upload(&self, image: ImageUpload) -> Result<UploadedImage> {
        let public_id = public_id(DEFAULT_FOLDER, &image.filename);
        self.images.write().await.insert(public_id.clone(), image.bytes);
        Ok(UploadedImage {
            secure_url: format!("memory://{}", public_id),
            public_id,
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<()> {
        match self.images.write().await.remove(public_id) {
            Some(_) => Ok(()),
            None => Err(Error::NotFound(format!("Image not found: {}", public_id))),
        }
    }
}
