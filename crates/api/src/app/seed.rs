//! Default data created on startup when missing.

use verdicomply_auth::Role;
use verdicomply_compliance::catalog;

use crate::app::services::{AppServices, ServiceResult};

/// Built-in accounts: username, password, role.
pub const DEFAULT_USERS: [(&str, &str, Role); 3] = [
    ("admin", "admin", Role::Admin),
    ("gestor", "gestor", Role::Gestor),
    ("auditor", "auditor", Role::Auditor),
];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub users: usize,
    pub departments: usize,
    pub norms: usize,
}

/// Insert default users, departments and norms that are not present yet.
///
/// Departments are matched by name and norms by code, so running this twice is a no-op.
pub async fn seed_defaults(services: &AppServices) -> ServiceResult<SeedReport> {
    let mut report = SeedReport::default();

    for (username, password, role) in DEFAULT_USERS {
        if services.accounts.ensure(username, password, role).await? {
            report.users += 1;
        }
    }

    let existing = services.departments.list().await?;
    for department in catalog::default_departments() {
        if existing.iter().any(|d| d.name == department.name) {
            continue;
        }
        services.departments.create(department.name).await?;
        report.departments += 1;
    }

    for norm in catalog::default_norms() {
        if services.norms.ensure(norm).await? {
            report.norms += 1;
        }
    }

    tracing::info!(
        users = report.users,
        departments = report.departments,
        norms = report.norms,
        "default data seeded"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdicomply_auth::PasswordHasher;
    use verdicomply_infra::Repositories;

    use crate::app::services::build_services;

    #[tokio::test]
    async fn seeding_twice_only_inserts_once() {
        let hasher = PasswordHasher::with_params(1024, 1, 1).unwrap();
        let services = build_services(Repositories::in_memory(), "secret", 3600, hasher);

        let first = seed_defaults(&services).await.unwrap();
        assert_eq!(first, SeedReport { users: 3, departments: 3, norms: 5 });

        let second = seed_defaults(&services).await.unwrap();
        assert_eq!(second, SeedReport::default());

        assert!(services.accounts.login("gestor", "gestor").await.unwrap().is_some());
        assert!(services.norms.by_code("ISO-14001").await.is_ok());
    }
}
