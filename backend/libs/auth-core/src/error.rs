use thiserror::Error;

/// Failures produced by the authentication pipeline.
///
/// `BadCredentials` is a single opaque variant: an unknown username and
/// a wrong password are indistinguishable to callers. `Store` stays
/// separate so a credential-store outage never reads as a rejected
/// login.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid username or password")]
    BadCredentials,

    #[error("invalid or expired token")]
    TokenInvalid,

    #[error("authentication required")]
    Unauthorized,

    #[error("invalid signing key: {0}")]
    InvalidSigningKey(String),

    #[error("token principal must not be empty")]
    EmptyPrincipal,

    #[error("credential store error: {0}")]
    Store(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type AuthResult<T> = Result<T, AuthError>;
