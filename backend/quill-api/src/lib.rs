//! Quill HTTP service: accounts, posts, and the token-based
//! authentication pipeline that guards them.

use std::sync::Arc;

use auth_core::{CredentialVerifier, TokenCodec};

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod openapi;
pub mod routes;

use db::{PostStore, UserStore};

/// Shared application state, cloned into every worker.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub posts: Arc<dyn PostStore>,
    pub verifier: Arc<CredentialVerifier>,
    pub codec: Arc<TokenCodec>,
}
