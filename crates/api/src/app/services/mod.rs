//! Application services: existence checks, parent resolution and persistence.
//!
//! Handlers never touch repositories directly; they call one of the services
//! bundled in [`AppServices`].

use std::sync::Arc;

use chrono::Duration;
use thiserror::Error;

use verdicomply_auth::{AuthError, Hs256JwtIssuer, PasswordHasher, TokenError, MAX_TOKEN_TTL_SECONDS};
use verdicomply_core::DomainError;
use verdicomply_infra::{Repositories, StoreError};

pub mod accounts;
pub mod audits;
pub mod compliance;
pub mod departments;
pub mod logs;
pub mod norms;
pub mod pending_items;

pub use accounts::{AccountService, IssuedToken};
pub use audits::{AuditService, AuditView};
pub use compliance::{ComplianceService, ComplianceView};
pub use departments::DepartmentService;
pub use logs::{ComplianceLogService, ComplianceLogView};
pub use norms::NormService;
pub use pending_items::{PendingItemService, PendingItemView};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

pub struct AppServices {
    pub departments: DepartmentService,
    pub audits: AuditService,
    pub norms: NormService,
    pub compliance: ComplianceService,
    pub pending_items: PendingItemService,
    pub logs: ComplianceLogService,
    pub accounts: AccountService,
}

impl AppServices {
    pub fn new(repos: Repositories, hasher: PasswordHasher, issuer: Hs256JwtIssuer) -> Self {
        Self {
            departments: DepartmentService::new(repos.clone()),
            audits: AuditService::new(repos.clone()),
            norms: NormService::new(repos.clone()),
            compliance: ComplianceService::new(repos.clone()),
            pending_items: PendingItemService::new(repos.clone()),
            logs: ComplianceLogService::new(repos.clone()),
            accounts: AccountService::new(repos, Arc::new(hasher), Arc::new(issuer)),
        }
    }
}

/// Build services over the given repositories with a token lifetime in seconds.
pub fn build_services(
    repos: Repositories,
    jwt_secret: &str,
    jwt_ttl_seconds: i64,
    hasher: PasswordHasher,
) -> AppServices {
    let ttl = Duration::seconds(jwt_ttl_seconds.clamp(1, MAX_TOKEN_TTL_SECONDS));
    let issuer = Hs256JwtIssuer::new(jwt_secret.as_bytes(), ttl);
    AppServices::new(repos, hasher, issuer)
}
