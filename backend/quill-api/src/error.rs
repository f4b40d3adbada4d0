//! Service-level error type and its HTTP rendering.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use auth_core::AuthError;

/// Everything a handler or the startup path can fail with.
///
/// Every variant renders as a JSON body of the form
/// `{"error": "...", "status": <code>}`. Server-side details stay in
/// the logs; clients only ever see the category message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid username or password")]
    BadCredentials,

    #[error("invalid or expired token")]
    TokenInvalid,

    #[error("authentication required")]
    Unauthorized,

    #[error("resource not found")]
    NotFound,

    #[error("{0}")]
    Conflict(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("failed to start server: {0}")]
    StartServer(String),

    #[error("internal server error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadCredentials | AppError::TokenInvalid | AppError::Unauthorized => {
                StatusCode::UNAUTHORIZED
            }
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_)
            | AppError::Database(_)
            | AppError::StartServer(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(detail = %self, "request failed");
            "internal server error".to_string()
        } else {
            self.to_string()
        };

        HttpResponse::build(status).json(json!({
            "error": message,
            "status": status.as_u16(),
        }))
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::BadCredentials => AppError::BadCredentials,
            AuthError::TokenInvalid => AppError::TokenInvalid,
            AuthError::Unauthorized => AppError::Unauthorized,
            AuthError::InvalidSigningKey(detail) => AppError::Config(detail),
            AuthError::EmptyPrincipal => AppError::Internal("empty token principal".to_string()),
            AuthError::Store(detail) => AppError::Database(detail),
            AuthError::Internal(detail) => AppError::Internal(detail),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failures_map_to_401() {
        for err in [
            AppError::BadCredentials,
            AppError::TokenInvalid,
            AppError::Unauthorized,
        ] {
            assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn status_codes_match_variants() {
        assert_eq!(AppError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Conflict("taken".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Validation("too short".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Database("gone".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[actix_web::test]
    async fn server_side_details_are_not_rendered() {
        let response = AppError::Database("password_hash column".into()).error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = actix_web::body::to_bytes(response.into_body())
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "internal server error");
        assert_eq!(body["status"], 500);
    }

    #[test]
    fn credential_errors_from_core_stay_indistinct() {
        let err: AppError = AuthError::BadCredentials.into();
        assert_eq!(err.to_string(), "invalid username or password");
    }
}
