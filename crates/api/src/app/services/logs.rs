use verdicomply_compliance::ComplianceLog;
use verdicomply_core::{ComplianceId, ComplianceLogId, DomainError};
use verdicomply_infra::{ComplianceLogRepository, CrudRepository, Repositories};

use super::{ComplianceService, ComplianceView, ServiceResult};

pub(crate) const NOT_FOUND: &str = "Log de conformidade não encontrado";

#[derive(Debug, Clone)]
pub struct ComplianceLogView {
    pub log: ComplianceLog,
    pub compliance: ComplianceView,
}

/// Audit-trail entries. Entries are appended and deleted, never edited.
pub struct ComplianceLogService {
    repos: Repositories,
    compliance: ComplianceService,
}

impl ComplianceLogService {
    pub fn new(repos: Repositories) -> Self {
        Self {
            compliance: ComplianceService::new(repos.clone()),
            repos,
        }
    }

    pub async fn list(&self) -> ServiceResult<Vec<ComplianceLogView>> {
        let logs = self.repos.logs.find_all().await?;
        self.expand_all(logs).await
    }

    pub async fn get(&self, id: ComplianceLogId) -> ServiceResult<ComplianceLogView> {
        let log = self
            .repos
            .logs
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(NOT_FOUND))?;
        self.expand(log).await
    }

    /// Entries for one compliance record, newest first.
    pub async fn by_compliance(&self, compliance_id: ComplianceId) -> ServiceResult<Vec<ComplianceLogView>> {
        self.compliance.require(compliance_id).await?;
        let logs = self.repos.logs.find_by_compliance(compliance_id).await?;
        self.expand_all(logs).await
    }

    pub async fn by_action(&self, action: &str) -> ServiceResult<Vec<ComplianceLogView>> {
        let logs = self.repos.logs.find_by_action(action).await?;
        self.expand_all(logs).await
    }

    pub async fn create(&self, mut log: ComplianceLog) -> ServiceResult<ComplianceLogView> {
        let compliance = self.compliance.get(log.compliance_id).await?;
        log.id = None;
        let log = self.repos.logs.save(log).await?;
        Ok(ComplianceLogView { log, compliance })
    }

    pub async fn delete(&self, id: ComplianceLogId) -> ServiceResult<()> {
        if !self.repos.logs.exists_by_id(id).await? {
            return Err(DomainError::not_found(NOT_FOUND).into());
        }
        Ok(self.repos.logs.delete_by_id(id).await?)
    }

    async fn expand(&self, log: ComplianceLog) -> ServiceResult<ComplianceLogView> {
        let compliance = self.compliance.get(log.compliance_id).await?;
        Ok(ComplianceLogView { log, compliance })
    }

    async fn expand_all(&self, logs: Vec<ComplianceLog>) -> ServiceResult<Vec<ComplianceLogView>> {
        let mut views = Vec::with_capacity(logs.len());
        for log in logs {
            views.push(self.expand(log).await?);
        }
        Ok(views)
    }
}
