//! Login and logout endpoints.

use axum::extract::State;
use axum::response::Json;
use axum::Extension;
use medilink_core::models::TokenGrant;
use serde::Deserialize;
use serde_json::{json, Value};
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::middleware::{Actor, ClientAddr};
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginBody {
    pub username: String,
    pub password: String,
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginBody,
    responses(
        (status = 200, description = "Bearer token with the user's profile"),
        (status = 401, description = "Incorrect username or password")
    )
)]
/// Exchange a username/password pair for a short-lived bearer token.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Extension(ClientAddr(addr)): Extension<ClientAddr>,
    Json(body): Json<LoginBody>,
) -> Result<Json<TokenGrant>, ApiError> {
    let grant = state
        .auth
        .login(&body.username, &body.password, addr.as_deref())
        .await?;
    Ok(Json(grant))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Logout recorded"),
        (status = 401, description = "Missing or invalid token")
    )
)]
/// Record the end of the caller's session in the audit trail.
#[axum::debug_handler]
pub async fn logout(
    State(state): State<AppState>,
    Extension(Actor(user_id)): Extension<Actor>,
    Extension(ClientAddr(addr)): Extension<ClientAddr>,
) -> Json<Value> {
    state.auth.logout(user_id, addr.as_deref()).await;
    Json(json!({ "message": "Successfully logged out" }))
}
