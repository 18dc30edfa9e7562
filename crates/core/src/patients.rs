//! Patient record access and mutation.
//!
//! Every operation here that touches patient-identifiable data writes one
//! audit entry after its primary effect succeeds. Reads log a view or
//! search; mutations log before/after snapshots. The recorder is fail-open,
//! so a broken audit store degrades observability, never data integrity.
//!
//! Mutations and their audit entries are deliberately not wrapped in one
//! transaction: an audit failure must not roll back the primary effect.

use chrono::Utc;
use serde_json::{Map, Value};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::audit::{actions, modules, AuditEvent, AuditRecorder};
use crate::models::{EncounterDetail, NewEncounter, PatientDetail, PatientRow};
use crate::{CoreError, CoreResult};

/// The only patient columns reachable through partial update. Everything
/// else is immutable on this path; unknown keys are dropped, not rejected.
pub const UPDATABLE_FIELDS: [&str; 6] = [
    "first_name",
    "last_name",
    "phone_number",
    "email",
    "address",
    "city",
];

const PATIENT_SELECT: &str = "SELECT p.*, g.value AS gender, h.name AS hospital_name \
     FROM patients p \
     LEFT JOIN enum_lookups g ON p.gender_id = g.lookup_id \
     LEFT JOIN hospitals h ON p.hospital_id = h.hospital_id";

/// Search strategy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    Id,
    NationalId,
    Phone,
    Name,
}

impl SearchKind {
    /// Unrecognised selectors fall back to the name strategy.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "id" => Self::Id,
            "national_id" => Self::NationalId,
            "phone" => Self::Phone,
            _ => Self::Name,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::NationalId => "national_id",
            Self::Phone => "phone",
            Self::Name => "name",
        }
    }
}

/// Patient reads and writes, each paired with its audit call site.
#[derive(Clone)]
pub struct PatientService {
    pool: SqlitePool,
    recorder: AuditRecorder,
}

impl PatientService {
    pub fn new(pool: SqlitePool, recorder: AuditRecorder) -> Self {
        Self { pool, recorder }
    }

    /// Fetch one active patient with resolved gender and hospital names.
    ///
    /// Logs `VIEW` once the read has succeeded; a miss terminates before
    /// any audit entry is written.
    pub async fn get_patient(
        &self,
        actor: i64,
        patient_id: i64,
        source: Option<&str>,
    ) -> CoreResult<PatientDetail> {
        let sql = format!("{PATIENT_SELECT} WHERE p.patient_id = ? AND p.is_active = 1");
        let patient = sqlx::query_as::<_, PatientDetail>(&sql)
            .bind(patient_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(CoreError::NotFound("patient"))?;

        self.recorder
            .record(
                AuditEvent::new(actor, actions::VIEW, modules::PATIENTS)
                    .table("patients")
                    .record_id(patient_id)
                    .source(source),
            )
            .await;

        Ok(patient)
    }

    /// Search active patients by the selected strategy.
    ///
    /// `id` and `national_id` match exactly; `phone` and `name` are
    /// case-insensitive contains-matches. The search itself is the audited
    /// action: one `SEARCH` entry is written whatever the result count,
    /// with the query and strategy as the before-snapshot.
    pub async fn search(
        &self,
        actor: i64,
        query: &str,
        kind: SearchKind,
        source: Option<&str>,
    ) -> CoreResult<Vec<PatientDetail>> {
        let pattern = format!("%{query}%");
        let results = match kind {
            SearchKind::Id => match query.trim().parse::<i64>() {
                Ok(id) => {
                    let sql = format!("{PATIENT_SELECT} WHERE p.is_active = 1 AND p.patient_id = ?");
                    sqlx::query_as::<_, PatientDetail>(&sql)
                        .bind(id)
                        .fetch_all(&self.pool)
                        .await?
                }
                // Patient ids are numeric; anything else matches nothing.
                Err(_) => Vec::new(),
            },
            SearchKind::NationalId => {
                let sql =
                    format!("{PATIENT_SELECT} WHERE p.is_active = 1 AND p.national_id_number = ?");
                sqlx::query_as::<_, PatientDetail>(&sql)
                    .bind(query)
                    .fetch_all(&self.pool)
                    .await?
            }
            SearchKind::Phone => {
                let sql =
                    format!("{PATIENT_SELECT} WHERE p.is_active = 1 AND p.phone_number LIKE ?");
                sqlx::query_as::<_, PatientDetail>(&sql)
                    .bind(&pattern)
                    .fetch_all(&self.pool)
                    .await?
            }
            SearchKind::Name => {
                let sql = format!(
                    "{PATIENT_SELECT} WHERE p.is_active = 1 \
                     AND (p.first_name LIKE ? OR p.last_name LIKE ?)"
                );
                sqlx::query_as::<_, PatientDetail>(&sql)
                    .bind(&pattern)
                    .bind(&pattern)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        self.recorder
            .record(
                AuditEvent::new(actor, actions::SEARCH, modules::PATIENTS)
                    .old_value(serde_json::json!({
                        "search_query": query,
                        "search_type": kind.as_str(),
                    }))
                    .source(source),
            )
            .await;

        Ok(results)
    }

    /// All encounters for a patient, newest first, with the treating
    /// doctor's display name. Logs `VIEW_ENCOUNTERS` against the patient.
    pub async fn list_encounters(
        &self,
        actor: i64,
        patient_id: i64,
        source: Option<&str>,
    ) -> CoreResult<Vec<EncounterDetail>> {
        let encounters = sqlx::query_as::<_, EncounterDetail>(
            "SELECT pe.encounter_id, pe.record_id, pe.patient_id, pe.doctor_id, \
             pe.chief_complaint, pe.diagnosis_description, pe.treatment_plan, pe.notes, \
             pe.encounter_date_time, u.first_name AS doctor_first_name, \
             u.last_name AS doctor_last_name \
             FROM patient_encounters pe \
             LEFT JOIN users u ON pe.doctor_id = u.user_id \
             WHERE pe.patient_id = ? \
             ORDER BY pe.encounter_date_time DESC",
        )
        .bind(patient_id)
        .fetch_all(&self.pool)
        .await?;

        self.recorder
            .record(
                AuditEvent::new(actor, actions::VIEW_ENCOUNTERS, modules::PATIENTS)
                    .table("patient_encounters")
                    .record_id(patient_id)
                    .source(source),
            )
            .await;

        Ok(encounters)
    }

    /// Partial field update over the allow-list.
    ///
    /// Reads the prior row first (a miss is `NotFound` before any mutation
    /// attempt), silently drops keys outside [`UPDATABLE_FIELDS`], and fails
    /// with `NoValidFields` when nothing is left. On success the audit entry
    /// carries the full prior row as the before-image and the filtered input
    /// mapping, not the resulting row, as the after-image.
    pub async fn update_patient(
        &self,
        actor: i64,
        patient_id: i64,
        fields: &Map<String, Value>,
        source: Option<&str>,
    ) -> CoreResult<()> {
        let prior = sqlx::query_as::<_, PatientRow>("SELECT * FROM patients WHERE patient_id = ?")
            .bind(patient_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(CoreError::NotFound("patient"))?;

        let accepted: Map<String, Value> = fields
            .iter()
            .filter(|(key, _)| UPDATABLE_FIELDS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        if accepted.is_empty() {
            return Err(CoreError::NoValidFields);
        }

        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new("UPDATE patients SET ");
        {
            let mut set = qb.separated(", ");
            for (field, value) in &accepted {
                // Column names come from the fixed allow-list, never from input.
                set.push(format!("{field} = "));
                match value {
                    Value::Null => set.push_bind_unseparated(None::<String>),
                    Value::String(text) => set.push_bind_unseparated(text.clone()),
                    other => set.push_bind_unseparated(other.to_string()),
                };
            }
            set.push("updated_by = ");
            set.push_bind_unseparated(actor);
            set.push("updated_at = ");
            set.push_bind_unseparated(Utc::now());
        }
        qb.push(" WHERE patient_id = ").push_bind(patient_id);
        qb.build().execute(&self.pool).await?;

        let before = serde_json::to_value(&prior).unwrap_or(Value::Null);
        self.recorder
            .record(
                AuditEvent::new(actor, actions::UPDATE, modules::PATIENTS)
                    .table("patients")
                    .record_id(patient_id)
                    .old_value(before)
                    .new_value(Value::Object(accepted))
                    .source(source),
            )
            .await;

        Ok(())
    }

    /// Create an encounter, lazily creating the patient's medical record on
    /// first use. Logs `CREATE` with the full payload as the after-image.
    pub async fn create_encounter(
        &self,
        actor: i64,
        patient_id: i64,
        encounter: &NewEncounter,
        source: Option<&str>,
    ) -> CoreResult<i64> {
        let patient_exists: Option<i64> =
            sqlx::query_scalar("SELECT patient_id FROM patients WHERE patient_id = ?")
                .bind(patient_id)
                .fetch_optional(&self.pool)
                .await?;
        if patient_exists.is_none() {
            return Err(CoreError::NotFound("patient"));
        }

        let record_id: Option<i64> =
            sqlx::query_scalar("SELECT record_id FROM medical_records WHERE patient_id = ?")
                .bind(patient_id)
                .fetch_optional(&self.pool)
                .await?;
        let record_id = match record_id {
            Some(id) => id,
            None => {
                let now = Utc::now();
                sqlx::query(
                    "INSERT INTO medical_records (patient_id, created_by, created_at, \
                     updated_at) VALUES (?, ?, ?, ?)",
                )
                .bind(patient_id)
                .bind(actor)
                .bind(now)
                .bind(now)
                .execute(&self.pool)
                .await?
                .last_insert_rowid()
            }
        };

        let now = Utc::now();
        let encounter_id = sqlx::query(
            "INSERT INTO patient_encounters (record_id, patient_id, doctor_id, \
             chief_complaint, diagnosis_description, treatment_plan, notes, \
             encounter_date_time, created_by, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record_id)
        .bind(patient_id)
        .bind(encounter.doctor_id)
        .bind(&encounter.chief_complaint)
        .bind(&encounter.diagnosis_description)
        .bind(&encounter.treatment_plan)
        .bind(&encounter.notes)
        .bind(encounter.encounter_date_time)
        .bind(actor)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        let after = serde_json::to_value(encounter).unwrap_or(Value::Null);
        self.recorder
            .record(
                AuditEvent::new(actor, actions::CREATE, modules::PATIENTS)
                    .table("patient_encounters")
                    .record_id(encounter_id)
                    .new_value(after)
                    .source(source),
            )
            .await;

        Ok(encounter_id)
    }
}
