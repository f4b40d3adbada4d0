//! Route table and the access rules that guard it.

use actix_web::web;

use auth_core::{Access, AccessPolicy};

use crate::handlers::{auth, health, posts, users};

/// Registers every HTTP route.
///
/// Keep this table in sync with [`access_policy`] below; a route added
/// here without a matching rule falls through to the authenticated
/// catch-all.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health))
        .route("/readiness", web::get().to(health::readiness))
        .service(
            web::scope("/api")
                .service(
                    web::scope("/auth")
                        .route("/login", web::post().to(auth::login))
                        .route("/me", web::get().to(auth::me)),
                )
                .service(
                    web::scope("/users")
                        .route("", web::post().to(users::register))
                        .route("", web::get().to(users::list_users))
                        .route("/{id}", web::get().to(users::get_user)),
                )
                .service(
                    web::scope("/posts")
                        .route("", web::post().to(posts::create_post))
                        .route("", web::get().to(posts::list_posts))
                        .route("/{id}", web::get().to(posts::get_post)),
                ),
        );
}

/// Access rules for the routes above. First match wins; anything not
/// listed requires authentication.
pub fn access_policy() -> AccessPolicy {
    AccessPolicy::new()
        .route("/health", Access::Public)
        .route("/readiness", Access::Public)
        .route("/api/v1/openapi.json", Access::Public)
        .route("/swagger-ui", Access::Public)
        .route("/api/auth/login", Access::Public)
        .route("/api/users/**", Access::Public)
        .route("/api/posts/**", Access::Public)
        .route("/**", Access::Authenticated)
}

// ============================================================================
// TESTS
// ============================================================================
