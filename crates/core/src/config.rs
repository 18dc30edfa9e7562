//! Runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into
//! services. The intent is to avoid reading process-wide environment
//! variables during request handling, which can lead to inconsistent
//! behaviour in multi-threaded runtimes and test harnesses.

use crate::{CoreError, CoreResult};

/// Configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct AppConfig {
    database_url: String,
    jwt_secret: String,
    bind_addr: String,
    allowed_origins: Vec<String>,
}

impl AppConfig {
    /// Create a new `AppConfig`.
    ///
    /// The JWT secret must be non-empty: running with a blank signing key
    /// would make every forged token verify.
    pub fn new(
        database_url: String,
        jwt_secret: String,
        bind_addr: String,
        allowed_origins: Vec<String>,
    ) -> CoreResult<Self> {
        if jwt_secret.trim().is_empty() {
            return Err(CoreError::InvalidConfig(
                "jwt_secret cannot be empty".into(),
            ));
        }
        if database_url.trim().is_empty() {
            return Err(CoreError::InvalidConfig(
                "database_url cannot be empty".into(),
            ));
        }

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr,
            allowed_origins,
        })
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    pub fn bind_addr(&self) -> &str {
        &self.bind_addr
    }

    pub fn allowed_origins(&self) -> &[String] {
        &self.allowed_origins
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_secret(secret: &str) -> CoreResult<AppConfig> {
        AppConfig::new(
            "sqlite::memory:".into(),
            secret.into(),
            "127.0.0.1:8000".into(),
            vec!["http://localhost:3000".into()],
        )
    }

    #[test]
    fn rejects_blank_jwt_secret() {
        assert!(matches!(
            config_with_secret("   "),
            Err(CoreError::InvalidConfig(_))
        ));
    }

    #[test]
    fn accepts_populated_config() {
        let cfg = config_with_secret("s3cret").expect("valid config");
        assert_eq!(cfg.bind_addr(), "127.0.0.1:8000");
        assert_eq!(cfg.allowed_origins().len(), 1);
    }
}
