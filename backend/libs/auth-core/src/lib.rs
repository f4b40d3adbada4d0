//! Stateless authentication primitives shared by Quill services.
//!
//! The crate covers the full login pipeline: credential verification
//! against a pluggable store, HMAC-signed bearer tokens, and path-based
//! access rules. It carries no web-framework dependency; services wire
//! these pieces into their own middleware.

pub mod error;
pub mod identity;
pub mod password;
pub mod policy;
pub mod token;
pub mod verifier;

pub use error::{AuthError, AuthResult};
pub use identity::AuthenticatedIdentity;
pub use policy::{Access, AccessPolicy};
pub use token::{SigningKey, TokenCodec};
pub use verifier::{Credential, CredentialStore, CredentialVerifier};
