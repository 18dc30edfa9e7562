//! Database pool construction and schema management.
//!
//! The schema is embedded and applied at startup; there is no migration
//! framework. Timestamps are stored as UTC text so that lexicographic
//! comparison in SQL matches chronological order.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::CoreResult;

const SCHEMA: &str = include_str!("schema.sql");

/// Open (creating if missing) the database at `database_url` and apply the
/// schema.
pub async fn connect(database_url: &str) -> CoreResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    init_schema(&pool).await?;
    Ok(pool)
}

/// In-memory database with the schema applied.
///
/// Single connection: each in-memory SQLite connection is its own database,
/// so a larger pool would hand out empty databases.
pub async fn connect_in_memory() -> CoreResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    init_schema(&pool).await?;
    Ok(pool)
}

pub async fn init_schema(pool: &SqlitePool) -> CoreResult<()> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::Utc;
    use sqlx::SqlitePool;

    /// Known-plaintext password for every seeded user.
    pub(crate) const SEED_PASSWORD: &str = "correct-horse";

    /// In-memory database seeded with a hospital, a gender lookup, two
    /// active users (1: records clerk, 2: doctor), one clinician role and
    /// two patients (1 active, 2 soft-deleted).
    pub(crate) async fn seeded_pool() -> SqlitePool {
        let pool = super::connect_in_memory().await.expect("in-memory pool");
        let now = Utc::now();
        let hash = bcrypt::hash(SEED_PASSWORD, 4).expect("bcrypt hash");

        sqlx::query("INSERT INTO hospitals (hospital_id, name) VALUES (1, 'Royal Infirmary')")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO enum_lookups (lookup_id, category, value) VALUES (1, 'gender', 'Female')",
        )
        .execute(&pool)
        .await
        .unwrap();

        for (id, username, first, last) in
            [(1, "avance", "Ava", "Nance"), (2, "drhart", "Ira", "Hart")]
        {
            sqlx::query(
                "INSERT INTO users (user_id, username, password_hash, email, first_name, \
                 last_name, hospital_id, is_active) VALUES (?, ?, ?, ?, ?, ?, 1, 1)",
            )
            .bind(id)
            .bind(username)
            .bind(&hash)
            .bind(format!("{username}@example.org"))
            .bind(first)
            .bind(last)
            .execute(&pool)
            .await
            .unwrap();
        }
        sqlx::query("INSERT INTO roles (role_id, role_name) VALUES (1, 'clinician')")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES (1, 1)")
            .execute(&pool)
            .await
            .unwrap();

        for (id, first, last, phone, national_id, active) in [
            (1, "Ana", "Moreno", "07700 900123", "NHS-900123", 1),
            (2, "Brendan", "Okafor", "07700 900456", "NHS-900456", 0),
        ] {
            sqlx::query(
                "INSERT INTO patients (patient_id, first_name, last_name, date_of_birth, \
                 phone_number, email, address, city, national_id_number, hospital_id, \
                 gender_id, is_active, created_at, updated_at) \
                 VALUES (?, ?, ?, '1987-04-12', ?, NULL, NULL, NULL, ?, 1, 1, ?, ?, ?)",
            )
            .bind(id)
            .bind(first)
            .bind(last)
            .bind(phone)
            .bind(national_id)
            .bind(active)
            .bind(now)
            .bind(now)
            .execute(&pool)
            .await
            .unwrap();
        }

        pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn schema_creates_expected_tables() {
        let pool = connect_in_memory().await.expect("pool");

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .expect("table listing");

        for expected in [
            "audit_logs",
            "medical_records",
            "patient_encounters",
            "patients",
            "users",
        ] {
            assert!(tables.iter().any(|t| t == expected), "missing {expected}");
        }
    }

    #[tokio::test]
    async fn connect_creates_the_database_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("medilink.db");
        let url = format!("sqlite://{}", path.display());

        let pool = connect(&url).await.expect("pool");
        sqlx::query("INSERT INTO hospitals (name) VALUES ('General')")
            .execute(&pool)
            .await
            .expect("insert");

        assert!(path.exists());
    }

    #[tokio::test]
    async fn init_schema_is_idempotent() {
        let pool = connect_in_memory().await.expect("pool");
        init_schema(&pool).await.expect("re-applying schema");
    }
}
