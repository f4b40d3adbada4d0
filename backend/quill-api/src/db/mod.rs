//! Storage traits and Postgres plumbing.
//!
//! Handlers only ever see the [`UserStore`] and [`PostStore`] traits;
//! the Postgres repositories implement them, and tests substitute
//! in-memory stores.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{NewPost, NewUser, Post, User};

pub mod post_repo;
pub mod user_repo;

pub use post_repo::PgPostRepository;
pub use user_repo::PgUserRepository;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: NewUser) -> AppResult<User>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;
    async fn list(&self) -> AppResult<Vec<User>>;
}

#[async_trait]
pub trait PostStore: Send + Sync {
    async fn insert(&self, post: NewPost) -> AppResult<Post>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Post>>;
    async fn list(&self) -> AppResult<Vec<Post>>;
}

pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(300))
        .max_lifetime(Duration::from_secs(1800))
        .connect(database_url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../migrations").run(pool).await
}
