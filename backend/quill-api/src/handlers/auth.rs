//! Login and identity introspection handlers.

use actix_web::{web, HttpResponse};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppError;
use crate::middleware::AuthenticatedUser;
use crate::models::LoginRequest;
use crate::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    pub principal: String,
    pub roles: Vec<String>,
}

/// Error envelope rendered for every failed request.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub status: u16,
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
pub async fn login(
    state: web::Data<AppState>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    // Empty fields shortcut to the same answer as a failed lookup so
    // the response never hints at which part was wrong.
    if payload.username.is_empty() || payload.password.is_empty() {
        return Err(AppError::BadCredentials);
    }

    let identity = state
        .verifier
        .authenticate(&payload.username, &payload.password)
        .await?;
    let token = state.codec.issue(&identity.principal, &identity.roles)?;

    tracing::info!(username = %identity.principal, "login succeeded");

    Ok(HttpResponse::Ok().json(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Caller identity", body = MeResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
pub async fn me(user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
    let AuthenticatedUser(identity) = user;

    Ok(HttpResponse::Ok().json(MeResponse {
        principal: identity.principal,
        roles: identity.roles,
    }))
}
