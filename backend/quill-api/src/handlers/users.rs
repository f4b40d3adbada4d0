//! Account registration and lookup handlers.

use actix_web::{web, HttpResponse};
use uuid::Uuid;
use validator::Validate;

use auth_core::password::hash_password;

use crate::error::AppError;
use crate::models::{NewUser, RegisterRequest, UserResponse};
use crate::AppState;

/// Role granted to every account created through the public API.
const DEFAULT_ROLE: &str = "USER";

#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 409, description = "Username or email taken", body = ErrorResponse)
    )
)]
pub async fn register(
    state: web::Data<AppState>,
    payload: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let mut req = payload.into_inner();
    req.username = req.username.trim().to_string();
    req.display_name = req.display_name.trim().to_string();
    req.email = req.email.trim().to_string();
    req.validate()?;

    let password_hash = hash_password(&req.password)?;

    let user = state
        .users
        .insert(NewUser {
            username: req.username,
            display_name: req.display_name,
            email: req.email,
            password_hash,
            roles: DEFAULT_ROLE.to_string(),
        })
        .await?;

    tracing::info!(username = %user.username, "user registered");

    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    responses(
        (status = 200, description = "All accounts, newest first", body = [UserResponse])
    )
)]
pub async fn list_users(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let users = state.users.list().await?;
    let body: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();

    Ok(HttpResponse::Ok().json(body))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "Users",
    params(
        ("id" = Uuid, Path, description = "Account id")
    ),
    responses(
        (status = 200, description = "Account found", body = UserResponse),
        (status = 404, description = "No such account", body = ErrorResponse)
    )
)]
pub async fn get_user(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    match state.users.find_by_id(id).await? {
        Some(user) => Ok(HttpResponse::Ok().json(UserResponse::from(user))),
        None => Err(AppError::NotFound),
    }
}
