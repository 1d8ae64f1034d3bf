//! Login and self-registration.

use std::sync::Arc;

use chrono::Utc;

use verdicomply_auth::{Hs256JwtIssuer, PasswordHasher, Role, UserAccount};
use verdicomply_core::DomainError;
use verdicomply_infra::Repositories;

use super::ServiceResult;

pub(crate) const USERNAME_TAKEN: &str = "Nome de usuário já existe";

/// A freshly signed token and the roles it carries.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub username: String,
    pub roles: Vec<Role>,
}

pub struct AccountService {
    repos: Repositories,
    hasher: Arc<PasswordHasher>,
    issuer: Arc<Hs256JwtIssuer>,
}

impl AccountService {
    pub fn new(repos: Repositories, hasher: Arc<PasswordHasher>, issuer: Arc<Hs256JwtIssuer>) -> Self {
        Self { repos, hasher, issuer }
    }

    /// Verify credentials and sign a token. `None` means unknown user or wrong password.
    pub async fn login(&self, username: &str, password: &str) -> ServiceResult<Option<IssuedToken>> {
        let Some(account) = self.repos.users.find_by_username(username).await? else {
            tracing::info!(username, "login for unknown user");
            return Ok(None);
        };

        if !self.hasher.verify(password, &account.password_hash)? {
            tracing::info!(username, "login with wrong password");
            return Ok(None);
        }

        let roles = vec![account.role];
        let token = self.issuer.issue(&account.username, roles.clone(), Utc::now())?;
        Ok(Some(IssuedToken {
            token,
            username: account.username,
            roles,
        }))
    }

    pub async fn register(&self, username: &str, password: &str, role: Role) -> ServiceResult<UserAccount> {
        if self.repos.users.exists_by_username(username).await? {
            return Err(DomainError::conflict(USERNAME_TAKEN).into());
        }

        let account = UserAccount {
            id: None,
            username: username.to_string(),
            password_hash: self.hasher.hash(password)?,
            role,
        };
        let saved = self.repos.users.save_user(account).await?;
        tracing::info!(username = %saved.username, role = saved.role.as_str(), "user registered");
        Ok(saved)
    }

    /// Create the account unless the username already exists. Returns whether it was created.
    pub async fn ensure(&self, username: &str, password: &str, role: Role) -> ServiceResult<bool> {
        if self.repos.users.exists_by_username(username).await? {
            return Ok(false);
        }
        self.register(username, password, role).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use verdicomply_auth::TokenError;

    fn service() -> AccountService {
        AccountService::new(
            Repositories::in_memory(),
            Arc::new(PasswordHasher::with_params(1024, 1, 1).unwrap()),
            Arc::new(Hs256JwtIssuer::new(b"test-secret", Duration::hours(1))),
        )
    }

    #[tokio::test]
    async fn registered_user_can_log_in() {
        let accounts = service();
        accounts.register("maria", "segredo1", Role::Gestor).await.unwrap();

        let issued = accounts.login("maria", "segredo1").await.unwrap().unwrap();
        assert_eq!(issued.username, "maria");
        assert_eq!(issued.roles, vec![Role::Gestor]);
        assert!(!issued.token.is_empty());
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_yield_none() {
        let accounts = service();
        accounts.register("maria", "segredo1", Role::Gestor).await.unwrap();

        assert!(accounts.login("maria", "errada").await.unwrap().is_none());
        assert!(accounts.login("joao", "segredo1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_username_is_a_conflict() {
        let accounts = service();
        accounts.register("maria", "segredo1", Role::Gestor).await.unwrap();

        let err = accounts.register("maria", "outra123", Role::Admin).await.unwrap_err();
        assert!(matches!(err, super::super::ServiceError::Domain(DomainError::Conflict(_))));
        assert!(!accounts.ensure("maria", "outra123", Role::Admin).await.unwrap());
    }

    #[tokio::test]
    async fn oversized_token_lifetime_fails_login_without_panicking() {
        let accounts = AccountService::new(
            Repositories::in_memory(),
            Arc::new(PasswordHasher::with_params(1024, 1, 1).unwrap()),
            Arc::new(Hs256JwtIssuer::new(b"test-secret", Duration::days(365 * 1_000_000))),
        );
        accounts.register("ana", "segredo1", Role::Auditor).await.unwrap();

        let err = accounts.login("ana", "segredo1").await.unwrap_err();
        assert!(matches!(err, super::super::ServiceError::Token(TokenError::Encoding(_))));
    }
}
