pub mod access_guard;
pub mod bearer_auth;

pub use access_guard::AccessGuard;
pub use bearer_auth::{AuthenticatedUser, BearerAuthenticator};
