//! API-side role guard.
//!
//! Each handler names the roles it accepts and calls [`require_roles`] before
//! touching a service. Roles are flat: ADMIN does not imply GESTOR.

use verdicomply_auth::{authorize, Role};

use crate::app::errors::ApiError;
use crate::context::PrincipalContext;

pub const ADMIN_ONLY: &[Role] = &[Role::Admin];
pub const MANAGERS: &[Role] = &[Role::Gestor, Role::Admin];
pub const ANY_ROLE: &[Role] = &[Role::Auditor, Role::Gestor, Role::Admin];

pub fn require_roles(principal: &PrincipalContext, allowed: &[Role]) -> Result<(), ApiError> {
    authorize(&principal.to_principal(), allowed).map_err(|e| {
        tracing::warn!(username = principal.username(), error = %e, "access denied");
        ApiError::Forbidden
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auditor_is_kept_out_of_manager_routes() {
        let auditor = PrincipalContext::new("auditor", vec![Role::Auditor]);
        assert!(matches!(require_roles(&auditor, MANAGERS), Err(ApiError::Forbidden)));
        assert!(require_roles(&auditor, ANY_ROLE).is_ok());
    }

    #[test]
    fn admin_passes_admin_only_routes() {
        let admin = PrincipalContext::new("admin", vec![Role::Admin]);
        assert!(require_roles(&admin, ADMIN_ONLY).is_ok());
        let gestor = PrincipalContext::new("gestor", vec![Role::Gestor]);
        assert!(require_roles(&gestor, ADMIN_ONLY).is_err());
    }
}
