use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use nc_core::{BlogPost, BlogStorage, Error, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::str::FromStr;
use std::sync::Arc;
use crate::StorageBackend;

const DEFAULT_URL: &str = "sqlite:posts.db";

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS posts (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        date TEXT NOT NULL,
        content TEXT NOT NULL,
        image_url TEXT,
        image_public_id TEXT,
        created_at TEXT NOT NULL
    )
    "#,
];

pub struct SqliteBlogStorage {
    pool: Arc<SqlitePool>,
}

fn storage_error(context: &str, e: sqlx::Error) -> Error {
    Error::Storage(format!("{}: {}", context, e))
}

impl SqliteBlogStorage {
    pub async fn new_with_url(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| storage_error("Invalid database URL", e))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| storage_error("Failed to connect to database", e))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| storage_error(&format!("Failed to run migration {}", i), e))?;
        }

        Ok(Self { pool: Arc::new(pool) })
    }

    fn row_to_post(row: &SqliteRow) -> Result<BlogPost> {
        let created_at: String = row.get("created_at");
        Ok(BlogPost {
            id: row.get("id"),
            title: row.get("title"),
            date: row.get("date"),
            content: row.get("content"),
            image_url: row.get::<Option<String>, _>("image_url"),
            image_public_id: row.get::<Option<String>, _>("image_public_id"),
            created_at: DateTime::parse_from_rfc3339(&created_at)
                .map_err(|e| Error::Storage(format!("Failed to parse date: {}", e)))?
                .with_timezone(&Utc),
        })
    }
}

#[async_trait]
impl StorageBackend for SqliteBlogStorage {
    fn get_error_message() -> &'static str {
        "SQLite database should be reachable (default ./posts.db)"
    }

    async fn connect(url: Option<&str>) -> Result<Self> {
        Self::new_with_url(url.unwrap_or(DEFAULT_URL)).await
    }
}

#[async_trait]
impl BlogStorage for SqliteBlogStorage {
    async fn list_posts(&self) -> Result<Vec<BlogPost>> {
        let rows = sqlx::query("SELECT * FROM posts ORDER BY created_at DESC")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| storage_error("Failed to fetch posts", e))?;

        rows.iter().map(Self::row_to_post).collect()
    }

    async fn create_post(&self, post: &BlogPost) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO posts
            (id, title, date, content, image_url, image_public_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&post.id)
        .bind(&post.title)
        .bind(&post.date)
        .bind(&post.content)
        .bind(post.image_url.as_deref())
        .bind(post.image_public_id.as_deref())
        // fixed-width timestamps keep lexical order equal to time order
        .bind(post.created_at.to_rfc3339_opts(SecondsFormat::Nanos, true))
        .execute(&*self.pool)
        .await
        .map_err(|e| storage_error("Failed to store post", e))?;

        Ok(())
    }

    async fn get_post(&self, id: &str) -> Result<Option<BlogPost>> {
        let row = sqlx::query("SELECT * FROM posts WHERE id = ?")
            .bind(id)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| storage_error("Failed to fetch post", e))?;

        row.as_ref().map(Self::row_to_post).transpose()
    }

    async fn delete_post(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&*self.pool)
            .await
            .map_err(|e| storage_error("Failed to delete post", e))?;

        Ok(result.rows_affected() > 0)
    }
}
