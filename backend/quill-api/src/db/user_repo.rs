//! Postgres-backed account storage.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use auth_core::{AuthError, AuthResult, Credential, CredentialStore};

use crate::db::UserStore;
use crate::error::{AppError, AppResult};
use crate::models::{NewUser, User};

/// Account repository. Also serves as the credential source for login,
/// so password hashes never travel further than the verifier.
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserRepository {
    async fn insert(&self, user: NewUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, display_name, email, password_hash, roles)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&user.username)
        .bind(&user.display_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.roles)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if e.to_string().contains("unique constraint") {
                AppError::Conflict("username or email already registered".to_string())
            } else {
                AppError::Database(e.to_string())
            }
        })
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }
}

#[async_trait]
impl CredentialStore for PgUserRepository {
    async fn find_credential_by_username(&self, username: &str) -> AuthResult<Option<Credential>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;

        Ok(user.map(|user| Credential {
            username: user.username,
            password_hash: user.password_hash,
            display_name: user.display_name,
            email: user.email,
            roles: user.roles,
        }))
    }
}
