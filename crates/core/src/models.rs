//! Shared row and payload types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A `patients` row as stored.
///
/// Serialized whole into the audit trail as the before-image of an update,
/// so every column is carried even where the API never returns it.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PatientRow {
    pub patient_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub phone_number: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub national_id_number: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub hospital_id: Option<i64>,
    pub gender_id: Option<i64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<i64>,
}

/// Patient row joined with resolved display values.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PatientDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub patient: PatientRow,
    pub gender: Option<String>,
    pub hospital_name: Option<String>,
}

/// Encounter row joined with the treating doctor's display name.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct EncounterDetail {
    pub encounter_id: i64,
    pub record_id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub chief_complaint: Option<String>,
    pub diagnosis_description: Option<String>,
    pub treatment_plan: Option<String>,
    pub notes: Option<String>,
    pub encounter_date_time: DateTime<Utc>,
    pub doctor_first_name: Option<String>,
    pub doctor_last_name: Option<String>,
}

/// Payload for encounter creation. Encounters are immutable once written;
/// there is no update counterpart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEncounter {
    pub doctor_id: i64,
    pub chief_complaint: Option<String>,
    pub diagnosis_description: Option<String>,
    pub treatment_plan: Option<String>,
    pub notes: Option<String>,
    pub encounter_date_time: DateTime<Utc>,
}

/// Authenticated user profile returned from login.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub user_id: i64,
    pub username: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub hospital_id: Option<i64>,
    pub department_id: Option<i64>,
    pub roles: Vec<String>,
}

/// Successful login response.
#[derive(Debug, Clone, Serialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub token_type: String,
    /// Seconds until the token expires.
    pub expires_in: i64,
    pub user: UserProfile,
}
