//! Session token issue and parse.
//!
//! Tokens are HS256 JWTs carrying the actor id as `sub` and an absolute
//! expiry. Parsing classifies failures so the API layer can report
//! "expired" distinctly from "invalid" without leaking anything further.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult};

/// Fixed session lifetime.
pub const TOKEN_TTL_MINUTES: i64 = 15;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    #[serde(skip_serializing_if = "Option::is_none")]
    sub: Option<i64>,
    exp: i64,
}

/// Issues and validates session tokens with a shared HS256 secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::minutes(TOKEN_TTL_MINUTES),
        }
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl.num_seconds()
    }

    /// Mint a token for `user_id` expiring `TOKEN_TTL_MINUTES` from now.
    pub fn issue(&self, user_id: i64) -> CoreResult<String> {
        self.issue_with_expiry(Some(user_id), Utc::now() + self.ttl)
    }

    fn issue_with_expiry(&self, sub: Option<i64>, expires_at: DateTime<Utc>) -> CoreResult<String> {
        let claims = Claims {
            sub,
            exp: expires_at.timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|_| CoreError::TokenInvalid)
    }

    /// Verify signature and expiry, returning the actor id.
    ///
    /// A structurally valid, correctly signed token without a `sub` claim is
    /// still rejected as invalid.
    pub fn parse(&self, token: &str) -> CoreResult<i64> {
        let mut validation = Validation::new(Algorithm::HS256);
        // No leeway: a token is expired the second its exp passes.
        validation.leeway = 0;

        let data =
            decode::<Claims>(token, &self.decoding, &validation).map_err(|err| {
                match err.kind() {
                    ErrorKind::ExpiredSignature => CoreError::TokenExpired,
                    _ => CoreError::TokenInvalid,
                }
            })?;

        data.claims.sub.ok_or(CoreError::TokenInvalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new("unit-test-secret")
    }

    #[test]
    fn issued_token_parses_immediately() {
        let tokens = issuer();
        let token = tokens.issue(42).expect("issue");
        assert_eq!(tokens.parse(&token).expect("parse"), 42);
    }

    #[test]
    fn expired_token_is_classified_as_expired() {
        let tokens = issuer();
        let token = tokens
            .issue_with_expiry(Some(42), Utc::now() - Duration::minutes(1))
            .expect("issue");
        assert!(matches!(tokens.parse(&token), Err(CoreError::TokenExpired)));
    }

    #[test]
    fn missing_subject_is_invalid_even_when_unexpired() {
        let tokens = issuer();
        let token = tokens
            .issue_with_expiry(None, Utc::now() + Duration::minutes(5))
            .expect("issue");
        assert!(matches!(tokens.parse(&token), Err(CoreError::TokenInvalid)));
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let token = issuer().issue(42).expect("issue");
        let other = TokenIssuer::new("a-different-secret");
        assert!(matches!(other.parse(&token), Err(CoreError::TokenInvalid)));
    }

    #[test]
    fn garbage_is_invalid() {
        assert!(matches!(
            issuer().parse("definitely.not.a-jwt"),
            Err(CoreError::TokenInvalid)
        ));
    }
}
