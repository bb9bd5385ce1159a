use async_trait::async_trait;
use crate::types::{BlogPost, ImageUpload, UploadedImage};
use crate::Result;

#[async_trait]
pub trait BlogStorage: Send + Sync {
    /// All posts, newest first
    async fn list_posts(&self) -> Result<Vec<BlogPost>>;

    /// Store a new post
    async fn create_post(&self, post: &BlogPost) -> Result<()>;

    async fn get_post(&self, id: &str) -> Result<Option<BlogPost>>;

    /// Delete a post, returning whether it existed
    async fn delete_post(&self, id: &str) -> Result<bool>;
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Upload an image and return where it can be fetched from
    async fn upload(&self, image: ImageUpload) -> Result<UploadedImage>;

    /// Remove a previously uploaded image
    async fn destroy(&self, public_id: &str) -> Result<()>;
}
