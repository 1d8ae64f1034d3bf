//! `verdicomply-auth`: authentication and role-based authorization.
//!
//! This crate is decoupled from HTTP and storage: it mints and verifies tokens,
//! hashes passwords and answers "may this principal do that" questions.

pub mod authorize;
pub mod claims;
pub mod error;
pub mod jwt;
pub mod password;
pub mod principal;
pub mod roles;
pub mod user;

pub use authorize::{authorize, AuthzError};
pub use claims::{validate_claims, JwtClaims, TokenValidationError};
pub use error::AuthError;
pub use jwt::{Hs256JwtIssuer, Hs256JwtValidator, JwtValidator, TokenError, MAX_TOKEN_TTL_SECONDS};
pub use password::PasswordHasher;
pub use principal::Principal;
pub use roles::Role;
pub use user::UserAccount;
