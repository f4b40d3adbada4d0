//! Environment-driven configuration.

use std::env;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Base64-encoded signing secret. Decoded and length-checked at
    /// startup, before any request is served.
    pub token_secret: String,
    /// Token lifetime in seconds.
    pub token_ttl: i64,
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins, or "*".
    pub allowed_origins: String,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv::dotenv().ok();

        let app = AppConfig {
            env: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8080),
        };

        let database = DatabaseConfig {
            url: env::var("DATABASE_URL")
                .map_err(|_| AppError::Config("DATABASE_URL missing".into()))?,
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
        };

        // The token lifetime feeds straight into expiry claims, so a
        // malformed value is a startup error rather than a silent default.
        let token_ttl = match env::var("JWT_TOKEN_TTL") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| AppError::Config("JWT_TOKEN_TTL must be a number of seconds".into()))?,
            Err(_) => 3600,
        };

        let auth = AuthConfig {
            token_secret: env::var("JWT_SECRET")
                .map_err(|_| AppError::Config("JWT_SECRET missing".into()))?,
            token_ttl,
        };

        let cors = CorsConfig {
            allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
        };

        Ok(Self {
            app,
            database,
            auth,
            cors,
        })
    }

    pub fn is_production(&self) -> bool {
        self.app.env == "production"
    }
}
