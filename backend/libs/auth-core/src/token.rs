//! HMAC-signed bearer tokens.
//!
//! Tokens are stateless: validity is decided entirely by signature and
//! timestamps, with no server-side record. The signing key is validated
//! once at startup and the codec built from it is immutable, so any
//! number of request tasks can issue and verify concurrently without
//! coordination.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{AuthError, AuthResult};
use crate::identity::AuthenticatedIdentity;

// ============================================================================
// Constants
// ============================================================================

/// Minimum decoded secret length: 256 bits.
const MIN_SECRET_BYTES: usize = 32;

/// Grace window for clock drift between issuing and verifying hosts,
/// applied both past expiry and before issuance.
const CLOCK_SKEW_SECONDS: u64 = 30;

const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

// ============================================================================
// Signing key
// ============================================================================

/// Symmetric signing secret, decoded and length-checked once at startup.
#[derive(Clone)]
pub struct SigningKey {
    bytes: Vec<u8>,
}

impl SigningKey {
    /// Decodes a base64-encoded secret, rejecting anything under
    /// 256 bits. Startup configuration must fail on this error instead
    /// of deferring it to request time.
    pub fn from_base64(encoded: &str) -> AuthResult<Self> {
        let bytes = STANDARD.decode(encoded.trim().as_bytes()).map_err(|e| {
            AuthError::InvalidSigningKey(format!("secret is not valid base64: {e}"))
        })?;

        if bytes.len() < MIN_SECRET_BYTES {
            return Err(AuthError::InvalidSigningKey(format!(
                "secret must decode to at least {MIN_SECRET_BYTES} bytes, got {}",
                bytes.len()
            )));
        }

        Ok(Self { bytes })
    }
}

/// The secret must never reach logs or error output.
impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey(..)")
    }
}

// ============================================================================
// Claims
// ============================================================================

/// Claims carried by an issued token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (the principal's username)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Role names; a missing or malformed claim reads as no roles
    #[serde(default, deserialize_with = "lenient_roles")]
    pub roles: Vec<String>,
}

/// Accepts the roles claim in any shape. String entries of an array are
/// kept; everything else collapses to an empty list instead of failing
/// the decode.
fn lenient_roles<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let roles = match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::String(role) => Some(role),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };
    Ok(roles)
}

// ============================================================================
// Codec
// ============================================================================

/// Issues and verifies signed bearer tokens.
///
/// Built once from a validated [`SigningKey`] and a token lifetime,
/// then shared by handle. Verification settings are pinned to HS256;
/// a token signed with any other algorithm is rejected.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(key: &SigningKey, ttl_seconds: i64) -> Self {
        let mut validation = Validation::new(TOKEN_ALGORITHM);
        validation.leeway = CLOCK_SKEW_SECONDS;
        validation.validate_exp = true;

        Self {
            encoding_key: EncodingKey::from_secret(&key.bytes),
            decoding_key: DecodingKey::from_secret(&key.bytes),
            validation,
            ttl: Duration::seconds(ttl_seconds),
        }
    }

    /// Builds a signed token for `principal` carrying `roles` as a
    /// claim, issued now and expiring after the configured lifetime.
    ///
    /// The only expected failure is an empty principal, which would
    /// mint a token that can never verify.
    pub fn issue(&self, principal: &str, roles: &[String]) -> AuthResult<String> {
        if principal.trim().is_empty() {
            return Err(AuthError::EmptyPrincipal);
        }

        let now = Utc::now();
        let claims = Claims {
            sub: principal.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            roles: roles.to_vec(),
        };

        encode(&Header::new(TOKEN_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("token encoding failed: {e}")))
    }

    /// Verifies a token and reconstructs the caller's identity.
    ///
    /// Every parse, signature, and timing failure collapses into
    /// [`AuthError::TokenInvalid`]; library detail never reaches the
    /// caller. A token is accepted only when the signature verifies,
    /// the current time sits within `[iat, exp]` plus the skew window,
    /// and the subject is non-empty.
    pub fn decode(&self, token: &str) -> AuthResult<AuthenticatedIdentity> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|_| AuthError::TokenInvalid)?;

        let claims = data.claims;
        if claims.sub.trim().is_empty() {
            return Err(AuthError::TokenInvalid);
        }

        // jsonwebtoken checks expiry; not-yet-valid is on us.
        let now = Utc::now().timestamp();
        if claims.iat > now + CLOCK_SKEW_SECONDS as i64 {
            return Err(AuthError::TokenInvalid);
        }

        Ok(AuthenticatedIdentity::new(claims.sub, claims.roles))
    }

    /// Same verification as [`TokenCodec::decode`], with every failure
    /// swallowed into `false`.
    pub fn is_valid(&self, token: &str) -> bool {
        self.decode(token).is_ok()
    }
}

// ============================================================================
// Tests
// ============================================================================
