//! Read-only reporting over the audit trail.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::CoreResult;

pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 100;
pub const DEFAULT_ACTIVITY_DAYS: i64 = 30;
pub const MAX_ACTIVITY_DAYS: i64 = 90;

/// Audited tables that count as part of a patient's clinical history.
const PATIENT_HISTORY_TABLES: &str = "('patients', 'patient_encounters', 'medical_records')";

const LOG_COLUMNS: &str = "al.log_id, al.user_id, al.action_type, al.module, al.table_name, \
     al.record_id_affected, al.old_value, al.new_value, al.ip_address, al.action_timestamp, \
     al.is_success, u.first_name, u.last_name, u.username";

/// Pagination inputs as they arrive from the API, before clamping.
#[derive(Debug, Clone, Copy, Default)]
pub struct Page {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl Page {
    fn resolve(self) -> (i64, i64) {
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let offset = self.offset.unwrap_or(0).max(0);
        (limit, offset)
    }
}

/// Optional filters for the audit log listing.
///
/// Values arrive as raw query-string text; absent or blank values mean
/// "no filter", never "match empty string". Numeric filters that fail to
/// parse match nothing (they are still filters, just ones no row satisfies),
/// and unparsable dates are treated as absent.
#[derive(Debug, Clone, Default)]
pub struct AuditLogFilter {
    pub patient_id: Option<String>,
    pub user_id: Option<String>,
    pub action_type: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub page: Page,
}

/// Audit entry joined with the acting user's display name.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AuditLogRecord {
    pub log_id: i64,
    pub user_id: i64,
    pub action_type: String,
    pub module: String,
    pub table_name: Option<String>,
    pub record_id_affected: Option<i64>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub ip_address: Option<String>,
    pub action_timestamp: DateTime<Utc>,
    pub is_success: bool,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ActionCount {
    pub action_type: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ActiveUser {
    pub user_id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: String,
    pub activity_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditSummary {
    pub today_activity: Vec<ActionCount>,
    pub week_activity: Vec<ActionCount>,
    pub most_active_users: Vec<ActiveUser>,
}

/// Read-only queries over the `audit_logs` table.
#[derive(Clone)]
pub struct AuditQueryService {
    pool: SqlitePool,
}

impl AuditQueryService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Filtered listing, newest first.
    pub async fn list_logs(&self, filter: &AuditLogFilter) -> CoreResult<Vec<AuditLogRecord>> {
        let (limit, offset) = filter.page.resolve();

        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(format!(
            "SELECT {LOG_COLUMNS} FROM audit_logs al \
             LEFT JOIN users u ON al.user_id = u.user_id WHERE 1=1"
        ));

        if let Some(patient_id) = numeric_filter(&filter.patient_id) {
            qb.push(" AND al.record_id_affected = ")
                .push_bind(patient_id)
                .push(" AND al.table_name = 'patients'");
        }
        if let Some(user_id) = numeric_filter(&filter.user_id) {
            qb.push(" AND al.user_id = ").push_bind(user_id);
        }
        if let Some(action_type) = text_filter(&filter.action_type) {
            qb.push(" AND al.action_type = ").push_bind(action_type);
        }
        if let Some(start) = date_filter(&filter.start_date) {
            qb.push(" AND al.action_timestamp >= ").push_bind(start);
        }
        if let Some(end) = date_filter(&filter.end_date) {
            // End date is inclusive: compare against the following midnight.
            qb.push(" AND al.action_timestamp < ")
                .push_bind(end + Duration::days(1));
        }

        qb.push(" ORDER BY al.action_timestamp DESC, al.log_id DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        Ok(qb
            .build_query_as::<AuditLogRecord>()
            .fetch_all(&self.pool)
            .await?)
    }

    /// Edit and access history for one patient across the clinical tables.
    pub async fn patient_history(
        &self,
        patient_id: i64,
        page: Page,
    ) -> CoreResult<Vec<AuditLogRecord>> {
        let (limit, offset) = page.resolve();
        let sql = format!(
            "SELECT {LOG_COLUMNS} FROM audit_logs al \
             LEFT JOIN users u ON al.user_id = u.user_id \
             WHERE al.record_id_affected = ? AND al.table_name IN {PATIENT_HISTORY_TABLES} \
             ORDER BY al.action_timestamp DESC, al.log_id DESC LIMIT ? OFFSET ?"
        );

        Ok(sqlx::query_as::<_, AuditLogRecord>(&sql)
            .bind(patient_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?)
    }

    /// One actor's entries over a trailing window of whole days.
    pub async fn user_activity(
        &self,
        user_id: i64,
        days: Option<i64>,
    ) -> CoreResult<Vec<AuditLogRecord>> {
        let days = days
            .unwrap_or(DEFAULT_ACTIVITY_DAYS)
            .clamp(1, MAX_ACTIVITY_DAYS);
        let since = Utc::now() - Duration::days(days);
        let sql = format!(
            "SELECT {LOG_COLUMNS} FROM audit_logs al \
             LEFT JOIN users u ON al.user_id = u.user_id \
             WHERE al.user_id = ? AND al.action_timestamp >= ? \
             ORDER BY al.action_timestamp DESC, al.log_id DESC"
        );

        Ok(sqlx::query_as::<_, AuditLogRecord>(&sql)
            .bind(user_id)
            .bind(since)
            .fetch_all(&self.pool)
            .await?)
    }

    /// Aggregate view: per-action counts for the current UTC day, per-action
    /// counts for the trailing 7 days, and the ten most active users over
    /// the same 7 days (count descending, user id ascending on ties).
    pub async fn summary(&self) -> CoreResult<AuditSummary> {
        let now = Utc::now();
        let today_start = now.date_naive().and_time(NaiveTime::MIN).and_utc();
        let week_start = now - Duration::days(7);

        let today_activity = self.action_counts_since(today_start).await?;
        let week_activity = self.action_counts_since(week_start).await?;

        let most_active_users = sqlx::query_as::<_, ActiveUser>(
            "SELECT u.user_id, u.first_name, u.last_name, u.username, \
             COUNT(*) AS activity_count \
             FROM audit_logs al JOIN users u ON al.user_id = u.user_id \
             WHERE al.action_timestamp >= ? \
             GROUP BY u.user_id \
             ORDER BY activity_count DESC, u.user_id ASC LIMIT 10",
        )
        .bind(week_start)
        .fetch_all(&self.pool)
        .await?;

        Ok(AuditSummary {
            today_activity,
            week_activity,
            most_active_users,
        })
    }

    async fn action_counts_since(&self, since: DateTime<Utc>) -> CoreResult<Vec<ActionCount>> {
        Ok(sqlx::query_as::<_, ActionCount>(
            "SELECT action_type, COUNT(*) AS count FROM audit_logs \
             WHERE action_timestamp >= ? GROUP BY action_type ORDER BY action_type",
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?)
    }
}

fn text_filter(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn numeric_filter(value: &Option<String>) -> Option<i64> {
    // A present-but-unparsable id is a filter no row can satisfy.
    text_filter(value).map(|v| v.parse().unwrap_or(-1))
}

fn date_filter(value: &Option<String>) -> Option<DateTime<Utc>> {
    text_filter(value)
        .and_then(|v| v.parse::<NaiveDate>().ok())
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
}
