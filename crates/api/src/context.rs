use verdicomply_auth::{Principal, Role};

/// Principal context for a request (authenticated username + roles).
///
/// Inserted by the auth middleware; every protected handler extracts it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    username: String,
    roles: Vec<Role>,
}

impl PrincipalContext {
    pub fn new(username: impl Into<String>, roles: Vec<Role>) -> Self {
        Self {
            username: username.into(),
            roles,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn to_principal(&self) -> Principal {
        Principal::new(self.username.clone(), self.roles.clone())
    }
}
