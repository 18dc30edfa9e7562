//! Audit trail reporting endpoints.

use axum::extract::{Path, Query, State};
use axum::response::Json;
use medilink_core::audit::query::{AuditLogFilter, AuditLogRecord, AuditSummary, Page};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::ApiError;
use crate::state::AppState;

/// Filters are passed through as raw text; blank and unparsable values are
/// resolved by the reporting service, not rejected here.
#[derive(Debug, Deserialize, IntoParams)]
pub struct LogsQuery {
    pub patient_id: Option<String>,
    pub user_id: Option<String>,
    pub action_type: Option<String>,
    /// Inclusive, `YYYY-MM-DD`.
    pub start_date: Option<String>,
    /// Inclusive, `YYYY-MM-DD`.
    pub end_date: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct DaysQuery {
    pub days: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/api/audit/logs",
    params(LogsQuery),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Audit entries, newest first")
    )
)]
/// Filtered audit log listing.
#[axum::debug_handler]
pub async fn list_logs(
    State(state): State<AppState>,
    Query(query): Query<LogsQuery>,
) -> Result<Json<Vec<AuditLogRecord>>, ApiError> {
    let filter = AuditLogFilter {
        patient_id: query.patient_id,
        user_id: query.user_id,
        action_type: query.action_type,
        start_date: query.start_date,
        end_date: query.end_date,
        page: Page {
            limit: query.limit,
            offset: query.offset,
        },
    };
    Ok(Json(state.audit.list_logs(&filter).await?))
}

#[utoipa::path(
    get,
    path = "/api/audit/patient/{patient_id}/history",
    params(("patient_id" = i64, Path, description = "Patient id"), PageQuery),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Access and edit history for one patient")
    )
)]
/// Who touched this patient's clinical data, and when.
#[axum::debug_handler]
pub async fn patient_history(
    State(state): State<AppState>,
    Path(patient_id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<AuditLogRecord>>, ApiError> {
    let page = Page {
        limit: query.limit,
        offset: query.offset,
    };
    Ok(Json(state.audit.patient_history(patient_id, page).await?))
}

#[utoipa::path(
    get,
    path = "/api/audit/user/{user_id}/activity",
    params(("user_id" = i64, Path, description = "User id"), DaysQuery),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "One user's recent actions")
    )
)]
/// One user's audit entries over a trailing window of days.
#[axum::debug_handler]
pub async fn user_activity(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(query): Query<DaysQuery>,
) -> Result<Json<Vec<AuditLogRecord>>, ApiError> {
    Ok(Json(state.audit.user_activity(user_id, query.days).await?))
}

#[utoipa::path(
    get,
    path = "/api/audit/summary",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Activity counts and most active users")
    )
)]
/// Dashboard aggregates over the audit trail.
#[axum::debug_handler]
pub async fn summary(State(state): State<AppState>) -> Result<Json<AuditSummary>, ApiError> {
    Ok(Json(state.audit.summary().await?))
}
