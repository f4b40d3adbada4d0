//! Access-policy enforcement middleware.
//!
//! Runs after bearer authentication. Requests for routes that require
//! an identity are answered with a JSON 401 before they reach a
//! handler; everything else passes through untouched.

use std::sync::Arc;

use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::{header, Method};
use actix_web::{Error, HttpMessage, ResponseError};
use futures::future::{ready, LocalBoxFuture, Ready};

use auth_core::AccessPolicy;

use crate::error::AppError;
use crate::middleware::bearer_auth::AuthenticatedUser;

/// A preflight is an OPTIONS request carrying both `Origin` and
/// `Access-Control-Request-Method`.
fn is_cors_preflight(req: &ServiceRequest) -> bool {
    req.method() == Method::OPTIONS
        && req.headers().contains_key(header::ORIGIN)
        && req
            .headers()
            .contains_key(header::ACCESS_CONTROL_REQUEST_METHOD)
}

pub struct AccessGuard {
    policy: Arc<AccessPolicy>,
}

impl AccessGuard {
    pub fn new(policy: Arc<AccessPolicy>) -> Self {
        Self { policy }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AccessGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = AccessGuardMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AccessGuardMiddleware {
            service: Arc::new(service),
            policy: self.policy.clone(),
        }))
    }
}

pub struct AccessGuardMiddleware<S> {
    service: Arc<S>,
    policy: Arc<AccessPolicy>,
}

impl<S, B> Service<ServiceRequest> for AccessGuardMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Arc::clone(&self.service);
        let policy = self.policy.clone();

        Box::pin(async move {
            // CORS preflights carry no credentials; the CORS layer
            // answers them. Plain OPTIONS requests stay subject to the
            // policy.
            if is_cors_preflight(&req) {
                let res = service.call(req).await?;
                return Ok(res.map_into_boxed_body());
            }

            let authenticated = req.extensions().get::<AuthenticatedUser>().is_some();

            match policy.authorize(req.path(), authenticated) {
                Ok(()) => {
                    let res = service.call(req).await?;
                    Ok(res.map_into_boxed_body())
                }
                Err(err) => {
                    tracing::debug!(path = req.path(), "request denied");
                    let response = AppError::from(err).error_response();
                    Ok(req.into_response(response))
                }
            }
        })
    }
}
