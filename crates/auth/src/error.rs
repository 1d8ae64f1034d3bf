use thiserror::Error;

/// Credential handling failures (hashing and verification).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("password hashing failed: {0}")]
    HashingFailed(String),

    #[error("stored password hash is not a valid PHC string")]
    InvalidHashFormat,
}
