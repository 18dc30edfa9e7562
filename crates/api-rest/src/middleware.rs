//! Request middleware: bearer authentication and client address capture.

use axum::extract::{ConnectInfo, Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use medilink_core::CoreError;
use std::net::SocketAddr;

use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated user id, inserted by [`require_bearer`] and consumed
/// by handlers through `Extension<Actor>`.
#[derive(Debug, Clone, Copy)]
pub struct Actor(pub i64);

/// Best-effort client address for the audit trail, inserted for every
/// request by [`client_context`].
#[derive(Debug, Clone)]
pub struct ClientAddr(pub Option<String>);

/// Reject requests without a valid bearer token.
///
/// Expired tokens get a distinct message from malformed or forged ones;
/// both are 401.
pub async fn require_bearer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(CoreError::TokenInvalid)?;

    let user_id = state.tokens.parse(token)?;
    request.extensions_mut().insert(Actor(user_id));

    Ok(next.run(request).await)
}

/// Record where the request came from.
///
/// Proxy headers win over the socket address: `x-forwarded-for` (first
/// hop), then `x-real-ip`, then the peer address itself.
pub async fn client_context(mut request: Request, next: Next) -> Response {
    let from_headers = ["x-forwarded-for", "x-real-ip"].iter().find_map(|name| {
        request
            .headers()
            .get(*name)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
    });

    let addr = from_headers.or_else(|| {
        request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(peer)| peer.ip().to_string())
    });

    request.extensions_mut().insert(ClientAddr(addr));
    next.run(request).await
}
