//! HS256 token issuing and verification on top of `jsonwebtoken`.
//!
//! Signature checks are delegated to the library; the time window is checked by
//! [`validate_claims`] against the caller-supplied clock so tests stay deterministic.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::{validate_claims, JwtClaims, Role, TokenValidationError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("token algorithm not accepted")]
    InvalidAlgorithm,

    #[error(transparent)]
    Claims(#[from] TokenValidationError),

    #[error("token encoding failed: {0}")]
    Encoding(String),
}

/// Longest accepted token lifetime (ten years).
pub const MAX_TOKEN_TTL_SECONDS: i64 = 10 * 365 * 86_400;

/// Verifies bearer tokens presented on protected routes.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenError>;
}

/// HMAC-SHA256 validator sharing its secret with [`Hs256JwtIssuer`].
#[derive(Clone)]
pub struct Hs256JwtValidator {
    key: DecodingKey,
    validation: Validation,
}

impl Hs256JwtValidator {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            key: DecodingKey::from_secret(secret.as_ref()),
            validation,
        }
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenError> {
        let data = decode::<JwtClaims>(token, &self.key, &self.validation).map_err(map_jwt_error)?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

/// Mints tokens for successful logins.
#[derive(Clone)]
pub struct Hs256JwtIssuer {
    key: EncodingKey,
    ttl: Duration,
}

impl Hs256JwtIssuer {
    pub fn new(secret: impl AsRef<[u8]>, ttl: Duration) -> Self {
        Self {
            key: EncodingKey::from_secret(secret.as_ref()),
            ttl,
        }
    }

    pub fn issue(&self, username: &str, roles: Vec<Role>, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = JwtClaims::new(username, roles, now, self.ttl)
            .ok_or_else(|| TokenError::Encoding("token expiry is out of range".to_string()))?;
        encode(&Header::new(Algorithm::HS256), &claims, &self.key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }
}

fn map_jwt_error(err: jsonwebtoken::errors::Error) -> TokenError {
    use jsonwebtoken::errors::ErrorKind;

    match err.kind() {
        ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        ErrorKind::InvalidAlgorithm => TokenError::InvalidAlgorithm,
        ErrorKind::ExpiredSignature => TokenError::Claims(TokenValidationError::Expired),
        ErrorKind::InvalidToken => TokenError::Malformed("malformed token".to_string()),
        ErrorKind::Base64(_) => TokenError::Malformed("invalid base64 encoding".to_string()),
        ErrorKind::Json(_) => TokenError::Malformed("invalid JSON in claims".to_string()),
        _ => TokenError::Malformed(format!("token validation failed: {err}")),
    }
}
