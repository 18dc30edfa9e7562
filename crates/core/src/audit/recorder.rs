//! Fail-open audit recording.

use chrono::Utc;
use serde_json::Value;
use sqlx::SqlitePool;

/// One auditable action, built by the call site that performed it.
///
/// `old_value`/`new_value` are structured snapshots; absence means the
/// action has no meaningful before or after image (a view, a login).
#[derive(Debug)]
pub struct AuditEvent<'a> {
    user_id: i64,
    action: &'a str,
    module: &'a str,
    table_name: Option<&'a str>,
    record_id: Option<i64>,
    old_value: Option<Value>,
    new_value: Option<Value>,
    source: Option<&'a str>,
    success: bool,
}

impl<'a> AuditEvent<'a> {
    pub fn new(user_id: i64, action: &'a str, module: &'a str) -> Self {
        Self {
            user_id,
            action,
            module,
            table_name: None,
            record_id: None,
            old_value: None,
            new_value: None,
            source: None,
            success: true,
        }
    }

    pub fn table(mut self, table_name: &'a str) -> Self {
        self.table_name = Some(table_name);
        self
    }

    pub fn record_id(mut self, record_id: i64) -> Self {
        self.record_id = Some(record_id);
        self
    }

    pub fn old_value(mut self, value: Value) -> Self {
        self.old_value = Some(value);
        self
    }

    pub fn new_value(mut self, value: Value) -> Self {
        self.new_value = Some(value);
        self
    }

    pub fn source(mut self, source: Option<&'a str>) -> Self {
        self.source = source;
        self
    }
}

/// Writes immutable entries to the `audit_logs` table.
///
/// Callers invoke [`record`](AuditRecorder::record) only after their primary
/// effect has durably succeeded, so the entry always reflects an action
/// that actually happened.
#[derive(Clone)]
pub struct AuditRecorder {
    pool: SqlitePool,
}

impl AuditRecorder {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist one audit entry, stamped with the current wall-clock time.
    ///
    /// Fail-open: a storage failure is reported to the operational log and
    /// swallowed, and the caller proceeds as though logging succeeded. The
    /// availability of the primary operation must not depend on audit-store
    /// health. Returns the new entry id, or `None` when the write failed.
    pub async fn record(&self, event: AuditEvent<'_>) -> Option<i64> {
        match self.insert(&event).await {
            Ok(log_id) => Some(log_id),
            Err(err) => {
                tracing::error!(
                    action = event.action,
                    user_id = event.user_id,
                    "audit write failed: {err}"
                );
                None
            }
        }
    }

    async fn insert(&self, event: &AuditEvent<'_>) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO audit_logs (user_id, action_type, module, table_name, \
             record_id_affected, old_value, new_value, ip_address, action_timestamp, \
             is_success) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(event.user_id)
        .bind(event.action)
        .bind(event.module)
        .bind(event.table_name)
        .bind(event.record_id)
        .bind(event.old_value.as_ref().map(Value::to_string))
        .bind(event.new_value.as_ref().map(Value::to_string))
        .bind(event.source)
        .bind(Utc::now())
        .bind(event.success)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }
}
