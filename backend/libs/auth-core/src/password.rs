//! Password hashing and verification using Argon2id.

use argon2::password_hash::{PasswordHasher, SaltString};
use argon2::{Argon2, PasswordHash, PasswordVerifier};

use crate::error::{AuthError, AuthResult};

/// Hash a password with a fresh random salt.
/// Returns the hash string suitable for storage.
pub fn hash_password(password: &str) -> AuthResult<String> {
    let salt = SaltString::generate(rand::thread_rng());

    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Internal(format!("password hashing failed: {e}")))?
        .to_string();

    Ok(password_hash)
}

/// Verify a plaintext password against a stored hash.
///
/// Every failure, including an unparseable stored hash, reports
/// [`AuthError::BadCredentials`].
pub fn verify_password(password: &str, hash: &str) -> AuthResult<()> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::BadCredentials)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::BadCredentials)
}
