use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use nc_core::{BlogPost, BlogStorage, Result};
use crate::StorageBackend;

/// Keeps posts in process memory. Contents are lost on restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlogStorage {
    posts: Arc<RwLock<Vec<BlogPost>>>,
}

impl MemoryBlogStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for MemoryBlogStorage {
    fn get_error_message() -> &'static str {
        "Memory storage should be available"
    }

    async fn connect(_url: Option<&str>) -> Result<Self> {
        Ok(Self::new())
    }
}

#[async_trait]
impl BlogStorage for MemoryBlogStorage {
    async fn list_posts(&self) -> Result<Vec<BlogPost>> {
        let mut posts = self.posts.read().await.clone();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn create_post(&self, post: &BlogPost) -> Result<()> {
        let mut posts = self.posts.write().await;
        if let Some(existing) = posts.iter_mut().find(|p| p.id == post.id) {
            *existing = post.clone();
        } else {
            posts.push(post.clone());
        }
        Ok(())
    }

    async fn get_post(&self, id: &str) -> Result<Option<BlogPost>> {
        Ok(self.posts.read().await.iter().find(|p| p.id == id).cloned())
    }

    async fn delete_post(&self, id: &str) -> Result<bool> {
        let mut posts = self.posts.write().await;
        let before = posts.len();
        posts.retain(|p| p.id != id);
        Ok(posts.len() != before)
    }
}
