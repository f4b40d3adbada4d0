//! Shared fixtures for the integration tests.
//!
//! The stores here are in-memory stand-ins for Postgres so the full
//! HTTP pipeline can be exercised without a database.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::Utc;
use uuid::Uuid;

use auth_core::{
    AuthError, AuthResult, Credential, CredentialStore, CredentialVerifier, SigningKey, TokenCodec,
};
use quill_api::db::{PostStore, UserStore};
use quill_api::error::{AppError, AppResult};
use quill_api::models::{NewPost, NewUser, Post, User};
use quill_api::AppState;

#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: NewUser) -> AppResult<User> {
        let mut users = self.users.write().unwrap();

        let taken = users
            .values()
            .any(|existing| existing.username == user.username || existing.email == user.email);
        if taken {
            return Err(AppError::Conflict(
                "username or email already registered".to_string(),
            ));
        }

        let now = Utc::now();
        let row = User {
            id: Uuid::new_v4(),
            username: user.username,
            display_name: user.display_name,
            email: user.email,
            password_hash: user.password_hash,
            roles: user.roles,
            created_at: now,
            updated_at: now,
        };
        users.insert(row.id, row.clone());

        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.read().unwrap().get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .read()
            .unwrap()
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let mut users: Vec<User> = self.users.read().unwrap().values().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }
}

#[async_trait]
impl CredentialStore for InMemoryUserStore {
    async fn find_credential_by_username(&self, username: &str) -> AuthResult<Option<Credential>> {
        let user = self
            .users
            .read()
            .map_err(|_| AuthError::Store("user store lock poisoned".to_string()))?
            .values()
            .find(|user| user.username == username)
            .cloned();

        Ok(user.map(|user| Credential {
            username: user.username,
            password_hash: user.password_hash,
            display_name: user.display_name,
            email: user.email,
            roles: user.roles,
        }))
    }
}

#[derive(Default)]
pub struct InMemoryPostStore {
    posts: RwLock<HashMap<Uuid, Post>>,
}

#[async_trait]
impl PostStore for InMemoryPostStore {
    async fn insert(&self, post: NewPost) -> AppResult<Post> {
        let row = Post {
            id: Uuid::new_v4(),
            author_id: post.author_id,
            title: post.title,
            content: post.content,
            created_at: Utc::now(),
        };
        self.posts.write().unwrap().insert(row.id, row.clone());

        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Post>> {
        Ok(self.posts.read().unwrap().get(&id).cloned())
    }

    async fn list(&self) -> AppResult<Vec<Post>> {
        let mut posts: Vec<Post> = self.posts.read().unwrap().values().cloned().collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }
}

pub fn test_signing_key() -> SigningKey {
    SigningKey::from_base64(&STANDARD.encode([7u8; 48])).unwrap()
}

pub fn test_codec() -> Arc<TokenCodec> {
    Arc::new(TokenCodec::new(&test_signing_key(), 3600))
}

/// Fully wired application state backed by the in-memory stores.
pub fn test_state() -> AppState {
    let users = Arc::new(InMemoryUserStore::default());
    let posts = Arc::new(InMemoryPostStore::default());
    let verifier = Arc::new(CredentialVerifier::new(users.clone()));

    AppState {
        users,
        posts,
        verifier,
        codec: test_codec(),
    }
}
