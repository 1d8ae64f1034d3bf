use verdicomply_compliance::{Audit, Department};
use verdicomply_core::{AuditId, DepartmentId, DomainError};
use verdicomply_infra::{AuditRepository, CrudRepository, Repositories};

use super::{departments, ServiceResult};

pub(crate) const NOT_FOUND: &str = "Auditoria não encontrada";

/// An audit together with the department it belongs to.
#[derive(Debug, Clone)]
pub struct AuditView {
    pub audit: Audit,
    pub department: Department,
}

pub struct AuditService {
    repos: Repositories,
}

impl AuditService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn list(&self) -> ServiceResult<Vec<AuditView>> {
        let audits = self.repos.audits.find_all().await?;
        self.expand_all(audits).await
    }

    pub async fn get(&self, id: AuditId) -> ServiceResult<AuditView> {
        let audit = self.find(id).await?;
        self.expand(audit).await
    }

    pub async fn by_status(&self, fragment: &str) -> ServiceResult<Vec<AuditView>> {
        let audits = self.repos.audits.find_by_status_containing(fragment).await?;
        self.expand_all(audits).await
    }

    pub async fn by_department(&self, department_id: DepartmentId) -> ServiceResult<Vec<AuditView>> {
        self.department(department_id).await?;
        let audits = self.repos.audits.find_by_department(department_id).await?;
        self.expand_all(audits).await
    }

    pub async fn create(&self, mut audit: Audit) -> ServiceResult<AuditView> {
        let department = self.department(audit.department_id).await?;
        audit.id = None;
        let saved = self.repos.audits.save(audit).await?;
        Ok(AuditView { audit: saved, department })
    }

    pub async fn update(&self, id: AuditId, mut audit: Audit) -> ServiceResult<AuditView> {
        self.find(id).await?;
        let department = self.department(audit.department_id).await?;
        audit.id = Some(id);
        let saved = self.repos.audits.save(audit).await?;
        Ok(AuditView { audit: saved, department })
    }

    pub async fn delete(&self, id: AuditId) -> ServiceResult<()> {
        if !self.repos.audits.exists_by_id(id).await? {
            return Err(DomainError::not_found(NOT_FOUND).into());
        }
        Ok(self.repos.audits.delete_by_id(id).await?)
    }

    async fn find(&self, id: AuditId) -> ServiceResult<Audit> {
        self.repos
            .audits
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(NOT_FOUND).into())
    }

    async fn expand(&self, audit: Audit) -> ServiceResult<AuditView> {
        let department = self.department(audit.department_id).await?;
        Ok(AuditView { audit, department })
    }

    async fn expand_all(&self, audits: Vec<Audit>) -> ServiceResult<Vec<AuditView>> {
        let mut views = Vec::with_capacity(audits.len());
        for audit in audits {
            views.push(self.expand(audit).await?);
        }
        Ok(views)
    }

    async fn department(&self, id: DepartmentId) -> ServiceResult<Department> {
        self.repos
            .departments
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(departments::NOT_FOUND).into())
    }
}
