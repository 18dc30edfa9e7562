//! Shared application state.

use medilink_core::audit::{AuditQueryService, AuditRecorder};
use medilink_core::auth::{AuthService, TokenIssuer};
use medilink_core::patients::PatientService;
use medilink_core::AppConfig;
use sqlx::SqlitePool;

/// Everything the request handlers need, cloned per request.
///
/// The services share one pool and one recorder; the token issuer is kept
/// separately so the bearer middleware can parse tokens without going
/// through the auth service.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub patients: PatientService,
    pub audit: AuditQueryService,
    pub tokens: TokenIssuer,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: &AppConfig) -> Self {
        let tokens = TokenIssuer::new(config.jwt_secret());
        let recorder = AuditRecorder::new(pool.clone());
        Self {
            auth: AuthService::new(pool.clone(), tokens.clone(), recorder.clone()),
            patients: PatientService::new(pool.clone(), recorder),
            audit: AuditQueryService::new(pool),
            tokens,
        }
    }
}
