//! Credential verification.

/// Check a submitted secret against a stored bcrypt hash.
///
/// Comparison is delegated entirely to the bcrypt library. A malformed
/// stored hash is a verification failure, not an error: the caller cannot
/// distinguish it from a wrong password.
pub fn verify_password(submitted: &str, stored_hash: &str) -> bool {
    match bcrypt::verify(submitted, stored_hash) {
        Ok(matched) => matched,
        Err(err) => {
            tracing::warn!("password hash verification failed: {err}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimum cost keeps the tests fast; production hashes use the
    // provisioning tool's cost.
    fn hash(password: &str) -> String {
        bcrypt::hash(password, 4).expect("bcrypt hash")
    }

    #[test]
    fn accepts_matching_password() {
        let stored = hash("letmein");
        assert!(verify_password("letmein", &stored));
    }

    #[test]
    fn rejects_wrong_password() {
        let stored = hash("letmein");
        assert!(!verify_password("letmeout", &stored));
    }

    #[test]
    fn malformed_hash_is_a_failure_not_a_panic() {
        assert!(!verify_password("letmein", "not-a-bcrypt-hash"));
        assert!(!verify_password("letmein", ""));
    }
}
