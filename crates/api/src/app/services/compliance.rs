use verdicomply_compliance::{ComplianceRecord, EnvironmentalNorm};
use verdicomply_core::{AuditId, ComplianceId, DomainError, Flag, NormId};
use verdicomply_infra::{ComplianceRecordRepository, CrudRepository, Repositories};

use super::{audits, norms, AuditService, AuditView, ServiceResult};

pub(crate) const NOT_FOUND: &str = "Conformidade não encontrada";

/// A compliance finding with its audit and norm resolved.
#[derive(Debug, Clone)]
pub struct ComplianceView {
    pub record: ComplianceRecord,
    pub audit: AuditView,
    pub norm: EnvironmentalNorm,
}

pub struct ComplianceService {
    repos: Repositories,
    audits: AuditService,
}

impl ComplianceService {
    pub fn new(repos: Repositories) -> Self {
        Self {
            audits: AuditService::new(repos.clone()),
            repos,
        }
    }

    pub async fn list(&self) -> ServiceResult<Vec<ComplianceView>> {
        let records = self.repos.compliance.find_all().await?;
        self.expand_all(records).await
    }

    pub async fn get(&self, id: ComplianceId) -> ServiceResult<ComplianceView> {
        let record = self.find(id).await?;
        self.expand(record).await
    }

    pub async fn by_audit(&self, audit_id: AuditId) -> ServiceResult<Vec<ComplianceView>> {
        if !self.repos.audits.exists_by_id(audit_id).await? {
            return Err(DomainError::not_found(audits::NOT_FOUND).into());
        }
        let records = self.repos.compliance.find_by_audit(audit_id).await?;
        self.expand_all(records).await
    }

    pub async fn by_flag(&self, compliant: Flag) -> ServiceResult<Vec<ComplianceView>> {
        let records = self.repos.compliance.find_by_flag(compliant).await?;
        self.expand_all(records).await
    }

    pub async fn by_norm(&self, norm_id: NormId) -> ServiceResult<Vec<ComplianceView>> {
        if !self.repos.norms.exists_by_id(norm_id).await? {
            return Err(DomainError::not_found(norms::NOT_FOUND).into());
        }
        let records = self.repos.compliance.find_by_norm(norm_id).await?;
        self.expand_all(records).await
    }

    pub async fn create(&self, mut record: ComplianceRecord) -> ServiceResult<ComplianceView> {
        let (audit, norm) = self.parents(record.audit_id, record.norm_id).await?;
        record.id = None;
        let record = self.repos.compliance.save(record).await?;
        Ok(ComplianceView { record, audit, norm })
    }

    pub async fn update(&self, id: ComplianceId, mut record: ComplianceRecord) -> ServiceResult<ComplianceView> {
        self.find(id).await?;
        let (audit, norm) = self.parents(record.audit_id, record.norm_id).await?;
        record.id = Some(id);
        let record = self.repos.compliance.save(record).await?;
        Ok(ComplianceView { record, audit, norm })
    }

    pub async fn delete(&self, id: ComplianceId) -> ServiceResult<()> {
        self.require(id).await?;
        Ok(self.repos.compliance.delete_by_id(id).await?)
    }

    /// Fails with the not-found error when no record has this id.
    pub async fn require(&self, id: ComplianceId) -> ServiceResult<()> {
        if !self.repos.compliance.exists_by_id(id).await? {
            return Err(DomainError::not_found(NOT_FOUND).into());
        }
        Ok(())
    }

    async fn find(&self, id: ComplianceId) -> ServiceResult<ComplianceRecord> {
        self.repos
            .compliance
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(NOT_FOUND).into())
    }

    async fn expand(&self, record: ComplianceRecord) -> ServiceResult<ComplianceView> {
        let (audit, norm) = self.parents(record.audit_id, record.norm_id).await?;
        Ok(ComplianceView { record, audit, norm })
    }

    async fn expand_all(&self, records: Vec<ComplianceRecord>) -> ServiceResult<Vec<ComplianceView>> {
        let mut views = Vec::with_capacity(records.len());
        for record in records {
            views.push(self.expand(record).await?);
        }
        Ok(views)
    }

    async fn parents(&self, audit_id: AuditId, norm_id: NormId) -> ServiceResult<(AuditView, EnvironmentalNorm)> {
        let audit = self.audits.get(audit_id).await?;
        let norm = self
            .repos
            .norms
            .find_by_id(norm_id)
            .await?
            .ok_or_else(|| DomainError::not_found(norms::NOT_FOUND))?;
        Ok((audit, norm))
    }
}
