//! Liveness and readiness probes.

use actix_web::HttpResponse;
use serde_json::json;

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": "quill-api",
    }))
}

pub async fn readiness() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ready",
        "service": "quill-api",
    }))
}
