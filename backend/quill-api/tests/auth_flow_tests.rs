//! End-to-end tests for the authentication pipeline.
//!
//! Every test drives the real HTTP stack: bearer authentication,
//! access enforcement, handlers, and the JSON error envelope. Storage
//! is swapped for the in-memory fixtures in `common`.

mod common;

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::Serialize;
use serde_json::json;

use quill_api::middleware::{AccessGuard, BearerAuthenticator};
use quill_api::routes;

use common::test_state;

// Claims shaped the way the service issues them, for forging tokens
// the service must reject.
#[derive(Serialize)]
struct ForgedClaims {
    sub: String,
    iat: i64,
    exp: i64,
    roles: Vec<String>,
}

fn forge_token(secret: &[u8], sub: &str, iat: i64, exp: i64) -> String {
    let claims = ForgedClaims {
        sub: sub.to_string(),
        iat,
        exp,
        roles: vec!["USER".to_string()],
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .expect("failed to encode token")
}

macro_rules! spawn_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.clone()))
                .wrap(AccessGuard::new(Arc::new(routes::access_policy())))
                .wrap(BearerAuthenticator::new($state.codec.clone()))
                .configure(routes::configure),
        )
        .await
    };
}

async fn register_user(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<actix_web::body::BoxBody>,
        Error = actix_web::Error,
    >,
    username: &str,
) -> serde_json::Value {
    let req = test::TestRequest::post()
        .uri("/api/users")
        .set_json(json!({
            "username": username,
            "password": "correct horse battery staple",
            "display_name": "Test User",
            "email": format!("{username}@example.com"),
        }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    test::read_body_json(resp).await
}

async fn login(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<actix_web::body::BoxBody>,
        Error = actix_web::Error,
    >,
    username: &str,
    password: &str,
) -> actix_web::dev::ServiceResponse<actix_web::body::BoxBody> {
    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"username": username, "password": password}))
        .to_request();
    test::call_service(app, req).await
}

// ============ TESTS ============

#[actix_web::test]
async fn test_register_login_me_round_trip() {
    let state = test_state();
    let app = spawn_app!(state);

    let created = register_user(&app, "alice").await;
    assert_eq!(created["username"], "alice");
    assert_eq!(created["roles"], json!(["USER"]));

    let resp = login(&app, "alice", "correct horse battery staple").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["token_type"], "Bearer");
    let token = body["token"].as_str().expect("token missing").to_string();

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let me: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(me["principal"], "alice");
    assert_eq!(me["roles"], json!(["USER"]));
}

#[actix_web::test]
async fn test_me_without_token_returns_401_envelope() {
    let state = test_state();
    let app = spawn_app!(state);

    let req = test::TestRequest::get().uri("/api/auth/me").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "authentication required");
    assert_eq!(body["status"], 401);
}

#[actix_web::test]
async fn test_public_routes_do_not_require_a_token() {
    let state = test_state();
    let app = spawn_app!(state);

    for path in ["/health", "/readiness", "/api/posts", "/api/users"] {
        let req = test::TestRequest::get().uri(path).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "{path}");
    }
}

#[actix_web::test]
async fn test_non_bearer_schemes_are_unauthorized() {
    let state = test_state();
    let app = spawn_app!(state);

    for header in ["Token abc", "Basic dXNlcjpwYXNz", "Bearer", ""] {
        let req = test::TestRequest::get()
            .uri("/api/auth/me")
            .insert_header(("Authorization", header))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{header:?}");
    }
}

#[actix_web::test]
async fn test_plain_options_requests_do_not_bypass_the_policy() {
    let state = test_state();
    let app = spawn_app!(state);

    let req = test::TestRequest::default()
        .method(actix_web::http::Method::OPTIONS)
        .uri("/api/auth/me")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_cors_preflights_pass_the_policy_gate() {
    let state = test_state();
    let app = spawn_app!(state);

    let req = test::TestRequest::default()
        .method(actix_web::http::Method::OPTIONS)
        .uri("/api/auth/me")
        .insert_header(("Origin", "http://localhost:3000"))
        .insert_header(("Access-Control-Request-Method", "GET"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    // No CORS layer in the test app; anything but a policy 401 means
    // the preflight reached the router.
    assert_ne!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_tampered_token_is_rejected() {
    let state = test_state();
    let app = spawn_app!(state);

    register_user(&app, "mallory").await;
    let resp = login(&app, "mallory", "correct horse battery staple").await;
    let body: serde_json::Value = test::read_body_json(resp).await;
    let token = body["token"].as_str().expect("token missing");

    // Flip a character in the signature segment.
    let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
    let sig = parts[2].clone();
    parts[2] = if sig.starts_with('A') {
        format!("B{}", &sig[1..])
    } else {
        format!("A{}", &sig[1..])
    };
    let tampered = parts.join(".");

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(("Authorization", format!("Bearer {tampered}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_token_signed_with_wrong_key_is_rejected() {
    let state = test_state();
    let app = spawn_app!(state);

    let now = chrono::Utc::now().timestamp();
    let forged = forge_token(&[9u8; 48], "alice", now, now + 3600);

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(("Authorization", format!("Bearer {forged}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_expired_token_is_rejected() {
    let state = test_state();
    let app = spawn_app!(state);

    // Signed with the real test key, but expired beyond the allowed
    // clock skew.
    let now = chrono::Utc::now().timestamp();
    let expired = forge_token(&[7u8; 48], "alice", now - 7200, now - 120);

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(("Authorization", format!("Bearer {expired}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_duplicate_registration_conflicts() {
    let state = test_state();
    let app = spawn_app!(state);

    register_user(&app, "carol").await;

    let req = test::TestRequest::post()
        .uri("/api/users")
        .set_json(json!({
            "username": "carol",
            "password": "another password entirely",
            "display_name": "Carol Again",
            "email": "carol@example.com",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn test_unknown_user_and_wrong_password_answer_identically() {
    let state = test_state();
    let app = spawn_app!(state);

    register_user(&app, "dave").await;

    let unknown = login(&app, "nobody", "whatever password").await;
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    let unknown_body = test::read_body(unknown).await;

    let wrong = login(&app, "dave", "not the right password").await;
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    let wrong_body = test::read_body(wrong).await;

    assert_eq!(unknown_body, wrong_body);
}

#[actix_web::test]
async fn test_login_with_empty_fields_is_rejected() {
    let state = test_state();
    let app = spawn_app!(state);

    for payload in [
        json!({"username": "", "password": "some password"}),
        json!({"username": "alice", "password": ""}),
    ] {
        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}

#[actix_web::test]
async fn test_registration_rejects_invalid_payload() {
    let state = test_state();
    let app = spawn_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/users")
        .set_json(json!({
            "username": "ed",  // too short
            "password": "short",
            "display_name": "Ed",
            "email": "not-an-email",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], 400);
}

#[actix_web::test]
async fn test_post_lifecycle() {
    let state = test_state();
    let app = spawn_app!(state);

    let author = register_user(&app, "frank").await;
    let author_id = author["id"].as_str().expect("id missing");

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .set_json(json!({
            "title": "First post",
            "content": "Hello from the integration tests.",
            "author_id": author_id,
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: serde_json::Value = test::read_body_json(resp).await;
    let post_id = created["id"].as_str().expect("post id missing").to_string();

    let req = test::TestRequest::get().uri("/api/posts").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let listed: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(1));

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{post_id}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{}", uuid::Uuid::new_v4()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_user_lookup_misses_return_404() {
    let state = test_state();
    let app = spawn_app!(state);

    let req = test::TestRequest::get()
        .uri(&format!("/api/users/{}", uuid::Uuid::new_v4()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_account_responses_never_leak_password_hashes() {
    let state = test_state();
    let app = spawn_app!(state);

    let created = register_user(&app, "grace").await;
    let id = created["id"].as_str().expect("id missing").to_string();

    for path in ["/api/users".to_string(), format!("/api/users/{id}")] {
        let req = test::TestRequest::get().uri(&path).to_request();
        let resp = test::call_service(&app, req).await;
        let body = test::read_body(resp).await;
        let text = String::from_utf8_lossy(&body);
        assert!(!text.contains("password_hash"), "{path} leaked a hash");
        assert!(!text.contains("$argon2"), "{path} leaked a hash");
    }
}
