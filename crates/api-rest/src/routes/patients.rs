//! Patient record endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::Extension;
use chrono::{DateTime, Utc};
use medilink_core::models::{EncounterDetail, NewEncounter, PatientDetail};
use medilink_core::patients::SearchKind;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::middleware::{Actor, ClientAddr};
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct SearchBody {
    pub query: String,
    /// One of `id`, `national_id`, `phone` or `name`; anything else is
    /// treated as `name`.
    #[serde(default)]
    pub search_type: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EncounterBody {
    pub doctor_id: i64,
    pub chief_complaint: Option<String>,
    pub diagnosis_description: Option<String>,
    pub treatment_plan: Option<String>,
    pub notes: Option<String>,
    pub encounter_date_time: DateTime<Utc>,
}

impl From<EncounterBody> for NewEncounter {
    fn from(body: EncounterBody) -> Self {
        Self {
            doctor_id: body.doctor_id,
            chief_complaint: body.chief_complaint,
            diagnosis_description: body.diagnosis_description,
            treatment_plan: body.treatment_plan,
            notes: body.notes,
            encounter_date_time: body.encounter_date_time,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/patients/{patient_id}",
    params(("patient_id" = i64, Path, description = "Patient id")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Patient with resolved gender and hospital names"),
        (status = 404, description = "Patient not found")
    )
)]
/// Fetch one active patient.
#[axum::debug_handler]
pub async fn get_patient(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    Extension(ClientAddr(addr)): Extension<ClientAddr>,
    Path(patient_id): Path<i64>,
) -> Result<Json<PatientDetail>, ApiError> {
    let patient = state
        .patients
        .get_patient(actor, patient_id, addr.as_deref())
        .await?;
    Ok(Json(patient))
}

#[utoipa::path(
    post,
    path = "/api/patients/search",
    request_body = SearchBody,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Matching active patients")
    )
)]
/// Search active patients by id, national id, phone or name.
#[axum::debug_handler]
pub async fn search(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    Extension(ClientAddr(addr)): Extension<ClientAddr>,
    Json(body): Json<SearchBody>,
) -> Result<Json<Vec<PatientDetail>>, ApiError> {
    let kind = SearchKind::parse(body.search_type.as_deref().unwrap_or("name"));
    let results = state
        .patients
        .search(actor, &body.query, kind, addr.as_deref())
        .await?;
    Ok(Json(results))
}

#[utoipa::path(
    put,
    path = "/api/patients/{patient_id}",
    params(("patient_id" = i64, Path, description = "Patient id")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Patient updated"),
        (status = 400, description = "No valid fields to update"),
        (status = 404, description = "Patient not found")
    )
)]
/// Partial update over the editable contact fields.
#[axum::debug_handler]
pub async fn update_patient(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    Extension(ClientAddr(addr)): Extension<ClientAddr>,
    Path(patient_id): Path<i64>,
    Json(fields): Json<Map<String, Value>>,
) -> Result<Json<Value>, ApiError> {
    state
        .patients
        .update_patient(actor, patient_id, &fields, addr.as_deref())
        .await?;
    Ok(Json(json!({ "message": "Patient updated successfully" })))
}

#[utoipa::path(
    get,
    path = "/api/patients/{patient_id}/encounters",
    params(("patient_id" = i64, Path, description = "Patient id")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Encounters, newest first")
    )
)]
/// All encounters for a patient.
#[axum::debug_handler]
pub async fn list_encounters(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    Extension(ClientAddr(addr)): Extension<ClientAddr>,
    Path(patient_id): Path<i64>,
) -> Result<Json<Vec<EncounterDetail>>, ApiError> {
    let encounters = state
        .patients
        .list_encounters(actor, patient_id, addr.as_deref())
        .await?;
    Ok(Json(encounters))
}

#[utoipa::path(
    post,
    path = "/api/patients/{patient_id}/encounters",
    params(("patient_id" = i64, Path, description = "Patient id")),
    request_body = EncounterBody,
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Encounter created"),
        (status = 404, description = "Patient not found")
    )
)]
/// Record a new encounter, creating the patient's medical record on first
/// use.
#[axum::debug_handler]
pub async fn create_encounter(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    Extension(ClientAddr(addr)): Extension<ClientAddr>,
    Path(patient_id): Path<i64>,
    Json(body): Json<EncounterBody>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let encounter_id = state
        .patients
        .create_encounter(actor, patient_id, &body.into(), addr.as_deref())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "encounter_id": encounter_id,
            "message": "Encounter created successfully",
        })),
    ))
}
