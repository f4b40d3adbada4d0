//! Postgres-backed post storage.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::PostStore;
use crate::error::{AppError, AppResult};
use crate::models::{NewPost, Post};

pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostStore for PgPostRepository {
    async fn insert(&self, post: NewPost) -> AppResult<Post> {
        sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (author_id, title, content)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(post.author_id)
        .bind(&post.title)
        .bind(&post.content)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if e.to_string().contains("foreign key constraint") {
                AppError::Validation("author does not exist".to_string())
            } else {
                AppError::Database(e.to_string())
            }
        })
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Post>> {
        let post = sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(post)
    }

    async fn list(&self) -> AppResult<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>("SELECT * FROM posts ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;

        Ok(posts)
    }
}
