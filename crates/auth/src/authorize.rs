use thiserror::Error;

use crate::{Principal, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: '{username}' lacks any of the roles [{required}]")]
    Forbidden { username: String, required: String },
}

/// Allow the principal when it holds at least one of `allowed`.
///
/// - No IO
/// - No panics
/// - Roles are flat: ADMIN does not imply GESTOR, each endpoint lists what it accepts
pub fn authorize(principal: &Principal, allowed: &[Role]) -> Result<(), AuthzError> {
    if allowed.iter().any(|role| principal.has_role(*role)) {
        return Ok(());
    }

    Err(AuthzError::Forbidden {
        username: principal.username.clone(),
        required: allowed.iter().map(Role::as_str).collect::<Vec<_>>().join(", "),
    })
}
