//! Credential verification and session lifecycle.

use sqlx::SqlitePool;

use crate::audit::{actions, modules, AuditEvent, AuditRecorder};
use crate::auth::password::verify_password;
use crate::auth::token::TokenIssuer;
use crate::models::{TokenGrant, UserProfile};
use crate::{CoreError, CoreResult};

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: i64,
    username: String,
    password_hash: String,
    email: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    hospital_id: Option<i64>,
    department_id: Option<i64>,
}

/// Logs users in and out, issuing session tokens on success.
#[derive(Clone)]
pub struct AuthService {
    pool: SqlitePool,
    tokens: TokenIssuer,
    recorder: AuditRecorder,
}

impl AuthService {
    pub fn new(pool: SqlitePool, tokens: TokenIssuer, recorder: AuditRecorder) -> Self {
        Self {
            pool,
            tokens,
            recorder,
        }
    }

    /// Verify a username/password pair and mint a session token.
    ///
    /// Unknown usernames, deactivated accounts and wrong passwords all
    /// collapse to `InvalidCredentials`; the response never reveals which
    /// check failed. A successful login is audited with the caller's
    /// network source.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        source: Option<&str>,
    ) -> CoreResult<TokenGrant> {
        let user = sqlx::query_as::<_, UserRow>(
            "SELECT user_id, username, password_hash, email, first_name, last_name, \
             hospital_id, department_id FROM users WHERE username = ? AND is_active = 1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(CoreError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash) {
            return Err(CoreError::InvalidCredentials);
        }

        let roles: Vec<String> = sqlx::query_scalar(
            "SELECT r.role_name FROM roles r \
             JOIN user_roles ur ON ur.role_id = r.role_id \
             WHERE ur.user_id = ? ORDER BY r.role_name",
        )
        .bind(user.user_id)
        .fetch_all(&self.pool)
        .await?;

        let access_token = self.tokens.issue(user.user_id)?;

        self.recorder
            .record(
                AuditEvent::new(user.user_id, actions::LOGIN, modules::AUTH).source(source),
            )
            .await;

        Ok(TokenGrant {
            access_token,
            token_type: "bearer".to_owned(),
            expires_in: self.tokens.ttl_seconds(),
            user: UserProfile {
                user_id: user.user_id,
                username: user.username,
                email: user.email,
                first_name: user.first_name,
                last_name: user.last_name,
                hospital_id: user.hospital_id,
                department_id: user.department_id,
                roles,
            },
        })
    }

    /// Record the end of a session.
    ///
    /// Tokens are not revocable server-side; logout exists so the audit
    /// trail brackets each session. It cannot fail.
    pub async fn logout(&self, user_id: i64, source: Option<&str>) {
        self.recorder
            .record(AuditEvent::new(user_id, actions::LOGOUT, modules::AUTH).source(source))
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{seeded_pool, SEED_PASSWORD};

    fn service(pool: &SqlitePool) -> AuthService {
        AuthService::new(
            pool.clone(),
            TokenIssuer::new("unit-test-secret"),
            AuditRecorder::new(pool.clone()),
        )
    }

    async fn audit_count(pool: &SqlitePool, action: &str) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM audit_logs WHERE action_type = ?")
            .bind(action)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn login_grants_a_parseable_token_with_profile_and_roles() {
        let pool = seeded_pool().await;
        let auth = service(&pool);

        let grant = auth
            .login("avance", SEED_PASSWORD, Some("10.0.0.5"))
            .await
            .unwrap();

        assert_eq!(grant.token_type, "bearer");
        assert_eq!(grant.expires_in, 15 * 60);
        assert_eq!(grant.user.username, "avance");
        assert_eq!(grant.user.first_name.as_deref(), Some("Ava"));
        assert_eq!(grant.user.roles, vec!["clinician".to_owned()]);

        let tokens = TokenIssuer::new("unit-test-secret");
        assert_eq!(tokens.parse(&grant.access_token).unwrap(), 1);

        assert_eq!(audit_count(&pool, "LOGIN").await, 1);
        let ip: String =
            sqlx::query_scalar("SELECT ip_address FROM audit_logs WHERE action_type = 'LOGIN'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(ip, "10.0.0.5");
    }

    #[tokio::test]
    async fn user_without_roles_logs_in_with_an_empty_role_list() {
        let pool = seeded_pool().await;
        let auth = service(&pool);

        let grant = auth.login("drhart", SEED_PASSWORD, None).await.unwrap();
        assert!(grant.user.roles.is_empty());
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_are_indistinguishable() {
        let pool = seeded_pool().await;
        let auth = service(&pool);

        assert!(matches!(
            auth.login("avance", "wrong", None).await,
            Err(CoreError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("nobody", SEED_PASSWORD, None).await,
            Err(CoreError::InvalidCredentials)
        ));
        assert_eq!(audit_count(&pool, "LOGIN").await, 0);
    }

    #[tokio::test]
    async fn deactivated_account_cannot_log_in() {
        let pool = seeded_pool().await;
        sqlx::query("UPDATE users SET is_active = 0 WHERE username = 'avance'")
            .execute(&pool)
            .await
            .unwrap();

        let auth = service(&pool);
        assert!(matches!(
            auth.login("avance", SEED_PASSWORD, None).await,
            Err(CoreError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn logout_is_audited() {
        let pool = seeded_pool().await;
        let auth = service(&pool);

        auth.logout(1, Some("10.0.0.5")).await;
        assert_eq!(audit_count(&pool, "LOGOUT").await, 1);
    }

    #[tokio::test]
    async fn logout_survives_a_broken_audit_store() {
        let pool = seeded_pool().await;
        sqlx::query("DROP TABLE audit_logs")
            .execute(&pool)
            .await
            .unwrap();

        service(&pool).logout(1, None).await;
    }
}
