//! # API REST
//!
//! REST surface for the MediLink hospital records system.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - Bearer authentication middleware
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS)
//!
//! Business logic lives in `medilink-core`; handlers here translate
//! between HTTP and the core services.

#![warn(rust_2018_idioms)]

pub mod doc;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::doc::ApiDoc;
use crate::middleware::{client_context, require_bearer};
use crate::state::AppState;

/// Build the full application router.
///
/// Everything except the banner, the health check and login sits behind
/// the bearer middleware.
pub fn app(state: AppState, allowed_origins: &[String]) -> Router {
    let protected = Router::new()
        .route("/api/auth/logout", post(routes::auth::logout))
        .route("/api/patients/search", post(routes::patients::search))
        .route(
            "/api/patients/:patient_id",
            get(routes::patients::get_patient).put(routes::patients::update_patient),
        )
        .route(
            "/api/patients/:patient_id/encounters",
            get(routes::patients::list_encounters).post(routes::patients::create_encounter),
        )
        .route("/api/audit/logs", get(routes::audit::list_logs))
        .route(
            "/api/audit/patient/:patient_id/history",
            get(routes::audit::patient_history),
        )
        .route(
            "/api/audit/user/:user_id/activity",
            get(routes::audit::user_activity),
        )
        .route("/api/audit/summary", get(routes::audit::summary))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_bearer,
        ));

    Router::new()
        .route("/", get(routes::root))
        .route("/api/health", get(routes::health))
        .route("/api/auth/login", post(routes::auth::login))
        .merge(protected)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(axum::middleware::from_fn(client_context))
        .layer(cors_layer(allowed_origins))
        .with_state(state)
}

/// A literal `*` origin means a fully permissive layer; otherwise only the
/// listed origins may make cross-origin calls.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
