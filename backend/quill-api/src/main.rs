use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;

use auth_core::{CredentialVerifier, SigningKey, TokenCodec};
use quill_api::{
    config::Config,
    db::{create_pool, run_migrations, PgPostRepository, PgUserRepository},
    error::AppError,
    middleware::{AccessGuard, BearerAuthenticator},
    openapi::ApiDoc,
    routes, AppState,
};

const SWAGGER_UI_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Quill API</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>
        window.onload = function() {
            SwaggerUIBundle({
                url: "/api/v1/openapi.json",
                dom_id: '#swagger-ui',
                deepLinking: true,
                presets: [SwaggerUIBundle.presets.apis],
            });
        };
    </script>
</body>
</html>"#;

#[actix_web::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,quill_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    tracing::info!("Starting quill-api v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    // ========================================
    // Initialize the token codec
    // ========================================
    // A bad signing secret must stop the process here, never surface
    // on a request.
    let signing_key = SigningKey::from_base64(&config.auth.token_secret)?;
    let codec = Arc::new(TokenCodec::new(&signing_key, config.auth.token_ttl));
    tracing::info!("Token codec initialized (ttl {}s)", config.auth.token_ttl);

    // Create database connection pool
    let db_pool = create_pool(&config.database.url, config.database.max_connections)
        .await
        .map_err(|e| AppError::StartServer(format!("database pool: {e}")))?;

    tracing::info!(
        "Database pool created with {} max connections",
        config.database.max_connections
    );

    // Run migrations in non-production unless explicitly skipped
    let run_migrations_env = std::env::var("RUN_MIGRATIONS").unwrap_or_else(|_| "true".into());
    if !config.is_production() && run_migrations_env != "false" {
        tracing::info!("Running database migrations...");
        match run_migrations(&db_pool).await {
            Ok(_) => tracing::info!("Database migrations completed"),
            Err(e) => tracing::warn!("Skipping migrations due to error: {:#}", e),
        }
    } else {
        tracing::info!(
            "Skipping database migrations (RUN_MIGRATIONS={})",
            run_migrations_env
        );
    }

    // ========================================
    // Wire up repositories and shared state
    // ========================================
    let user_repo = Arc::new(PgUserRepository::new(db_pool.clone()));
    let post_repo = Arc::new(PgPostRepository::new(db_pool.clone()));
    let verifier = Arc::new(CredentialVerifier::new(user_repo.clone()));
    let policy = Arc::new(routes::access_policy());

    let state = AppState {
        users: user_repo,
        posts: post_repo,
        verifier,
        codec: codec.clone(),
    };

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at http://{}", bind_address);

    let server_config = config.clone();
    HttpServer::new(move || {
        // Build CORS configuration from allowed_origins
        let mut cors = Cors::default();
        for origin in server_config.cors.allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else if !origin.is_empty() {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            // Wraps run last-registered first, so the authenticator
            // sees the request before the guard consults the policy.
            .wrap(AccessGuard::new(policy.clone()))
            .wrap(BearerAuthenticator::new(codec.clone()))
            .route(
                "/api/v1/openapi.json",
                web::get().to(|| async {
                    HttpResponse::Ok()
                        .content_type("application/json")
                        .json(ApiDoc::openapi())
                }),
            )
            // Swagger UI (CDN-hosted)
            .route(
                "/swagger-ui",
                web::get().to(|| async {
                    HttpResponse::Ok()
                        .content_type("text/html; charset=utf-8")
                        .body(SWAGGER_UI_HTML)
                }),
            )
            .configure(routes::configure)
    })
    .bind(&bind_address)
    .map_err(|e| AppError::StartServer(format!("bind {bind_address}: {e}")))?
    .run()
    .await
    .map_err(|e| AppError::StartServer(e.to_string()))
}
