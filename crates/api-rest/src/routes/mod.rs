//! HTTP endpoint handlers.

pub mod audit;
pub mod auth;
pub mod patients;

use axum::response::Json;
use chrono::Utc;
use serde_json::{json, Value};

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service banner")
    )
)]
/// Service banner with the API version.
#[axum::debug_handler]
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "MediLink Health API",
        "version": "1.0.0",
    }))
}

#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Health check response")
    )
)]
/// Liveness check for monitoring and load balancers.
#[axum::debug_handler]
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now(),
    }))
}
