/// Error taxonomy for core operations.
///
/// Authentication failures deliberately carry no internal detail; the API
/// layer maps them straight to 401 responses. Storage faults keep their
/// source for the operational log but are never exposed to clients.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("token expired")]
    TokenExpired,
    #[error("invalid token")]
    TokenInvalid,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("no valid fields to update")]
    NoValidFields,
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
