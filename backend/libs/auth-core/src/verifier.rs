//! Credential verification against an external user store.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{AuthError, AuthResult};
use crate::identity::AuthenticatedIdentity;
use crate::password;

/// Stored login credential. Owned by the user store; this crate only
/// reads it. Roles are kept comma-joined in storage.
#[derive(Debug, Clone)]
pub struct Credential {
    pub username: String,
    pub password_hash: String,
    pub display_name: String,
    pub email: String,
    pub roles: String,
}

impl Credential {
    /// Splits the stored role string, trimming entries and dropping
    /// empties.
    pub fn parse_roles(&self) -> Vec<String> {
        self.roles
            .split(',')
            .map(|role| role.trim().to_string())
            .filter(|role| !role.is_empty())
            .collect()
    }
}

/// Lookup capability the verifier depends on. Implemented over
/// Postgres in the service and by in-memory doubles in tests.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_credential_by_username(&self, username: &str)
        -> AuthResult<Option<Credential>>;
}

/// Plaintext behind the hash verified on lookup misses. Its result is
/// always discarded.
const MISS_PASSWORD: &str = "quill-verifier-miss";

/// Confirms username/password pairs against stored credentials.
pub struct CredentialVerifier {
    store: Arc<dyn CredentialStore>,
    miss_hash: String,
}

impl CredentialVerifier {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        // Hashing a fixed ASCII input does not fail; an empty fallback
        // still burns a parse in verify_password.
        let miss_hash = password::hash_password(MISS_PASSWORD).unwrap_or_default();
        Self { store, miss_hash }
    }

    /// Authenticates a login attempt.
    ///
    /// An unknown username and a wrong password produce the identical
    /// [`AuthError::BadCredentials`]. Store failures propagate as
    /// [`AuthError::Store`].
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> AuthResult<AuthenticatedIdentity> {
        let credential = match self.store.find_credential_by_username(username).await? {
            Some(credential) => credential,
            None => {
                // Burn the same hashing work as a real mismatch so an
                // unknown username costs what a wrong password costs.
                let _ = password::verify_password(password, &self.miss_hash);
                tracing::debug!(username, "login attempt for unknown username");
                return Err(AuthError::BadCredentials);
            }
        };

        if let Err(err) = password::verify_password(password, &credential.password_hash) {
            tracing::debug!(username, "login attempt with mismatched password");
            return Err(err);
        }

        let roles = credential.parse_roles();
        Ok(AuthenticatedIdentity::new(credential.username, roles))
    }
}
