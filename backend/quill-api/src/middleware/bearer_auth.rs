//! Bearer-token authentication middleware.
//!
//! Runs on every request. When a valid token is present the decoded
//! identity is attached to the request extensions; otherwise the
//! request continues unauthenticated and the access guard decides
//! whether that is acceptable for the route.

use std::rc::Rc;
use std::sync::Arc;

use actix_web::dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};
use futures::future::{ready, LocalBoxFuture, Ready};

use auth_core::{AuthenticatedIdentity, TokenCodec};

use crate::error::AppError;

/// Identity of the caller for the current request.
///
/// Inserted by [`BearerAuthenticator`]; extracted by handlers that
/// need to know who is calling. Extraction fails with 401 when the
/// request never presented a valid token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub AuthenticatedIdentity);

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUser>().cloned() {
            Some(user) => ready(Ok(user)),
            None => ready(Err(AppError::Unauthorized.into())),
        }
    }
}

/// Pulls the token out of an `Authorization` header value.
///
/// The scheme is matched case-insensitively and surrounding whitespace
/// is ignored. Anything that is not `Bearer <token>` yields `None`.
pub(crate) fn extract_bearer(header: &str) -> Option<&str> {
    let (scheme, rest) = header.trim().split_once(char::is_whitespace)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = rest.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

pub struct BearerAuthenticator {
    codec: Arc<TokenCodec>,
}

impl BearerAuthenticator {
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self { codec }
    }
}

impl<S, B> Transform<S, ServiceRequest> for BearerAuthenticator
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = BearerAuthenticatorMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(BearerAuthenticatorMiddleware {
            service: Rc::new(service),
            codec: self.codec.clone(),
        }))
    }
}

pub struct BearerAuthenticatorMiddleware<S> {
    service: Rc<S>,
    codec: Arc<TokenCodec>,
}

impl<S, B> Service<ServiceRequest> for BearerAuthenticatorMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let codec = self.codec.clone();

        Box::pin(async move {
            // Owned copy so no header borrow is alive when the
            // extensions are mutated below.
            let header = req
                .headers()
                .get("Authorization")
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned);

            if let Some(token) = header.as_deref().and_then(extract_bearer) {
                match codec.decode(token) {
                    Ok(identity) => {
                        req.extensions_mut().insert(AuthenticatedUser(identity));
                    }
                    Err(err) => {
                        tracing::debug!(error = %err, "rejected bearer token");
                    }
                }
            }

            service.call(req).await
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
