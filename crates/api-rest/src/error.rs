//! Mapping from core errors to HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use medilink_core::CoreError;
use serde_json::json;

/// Wrapper so core errors can be returned straight from handlers with `?`.
///
/// Storage faults are reported to the operational log and collapsed to a
/// generic message; response bodies never carry driver detail.
pub struct ApiError(pub CoreError);

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self.0 {
            CoreError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Incorrect username or password")
            }
            CoreError::TokenExpired => (StatusCode::UNAUTHORIZED, "Token has expired"),
            CoreError::TokenInvalid => (StatusCode::UNAUTHORIZED, "Could not validate credentials"),
            CoreError::NotFound("patient") => (StatusCode::NOT_FOUND, "Patient not found"),
            CoreError::NotFound(_) => (StatusCode::NOT_FOUND, "Resource not found"),
            CoreError::NoValidFields => (StatusCode::BAD_REQUEST, "No valid fields to update"),
            CoreError::Storage(_) | CoreError::InvalidConfig(_) => {
                tracing::error!("request failed: {}", self.0);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error occurred")
            }
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: CoreError) -> StatusCode {
        ApiError(err).into_response().status()
    }

    #[test]
    fn auth_failures_are_401() {
        assert_eq!(status_of(CoreError::InvalidCredentials), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(CoreError::TokenExpired), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(CoreError::TokenInvalid), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn lookup_and_validation_failures_keep_their_codes() {
        assert_eq!(status_of(CoreError::NotFound("patient")), StatusCode::NOT_FOUND);
        assert_eq!(status_of(CoreError::NoValidFields), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn storage_faults_are_opaque_500s() {
        assert_eq!(
            status_of(CoreError::Storage(sqlx::Error::PoolClosed)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
