use chrono::NaiveDate;

use verdicomply_compliance::PendingItem;
use verdicomply_core::{ComplianceId, DomainError, Flag, PendingItemId};
use verdicomply_infra::{CrudRepository, PendingItemRepository, Repositories};

use super::{ComplianceService, ComplianceView, ServiceResult};

pub(crate) const NOT_FOUND: &str = "Pendência não encontrada";

#[derive(Debug, Clone)]
pub struct PendingItemView {
    pub item: PendingItem,
    pub compliance: ComplianceView,
}

pub struct PendingItemService {
    repos: Repositories,
    compliance: ComplianceService,
}

impl PendingItemService {
    pub fn new(repos: Repositories) -> Self {
        Self {
            compliance: ComplianceService::new(repos.clone()),
            repos,
        }
    }

    pub async fn list(&self) -> ServiceResult<Vec<PendingItemView>> {
        let items = self.repos.pending_items.find_all().await?;
        self.expand_all(items).await
    }

    pub async fn get(&self, id: PendingItemId) -> ServiceResult<PendingItemView> {
        let item = self.find(id).await?;
        self.expand(item).await
    }

    pub async fn by_compliance(&self, compliance_id: ComplianceId) -> ServiceResult<Vec<PendingItemView>> {
        self.compliance.require(compliance_id).await?;
        let items = self.repos.pending_items.find_by_compliance(compliance_id).await?;
        self.expand_all(items).await
    }

    pub async fn by_resolved(&self, resolved: Flag) -> ServiceResult<Vec<PendingItemView>> {
        let items = self.repos.pending_items.find_by_resolved(resolved).await?;
        self.expand_all(items).await
    }

    /// Unresolved items due strictly before `reference`.
    pub async fn overdue(&self, reference: NaiveDate) -> ServiceResult<Vec<PendingItemView>> {
        let items = self.repos.pending_items.find_overdue(reference).await?;
        self.expand_all(items).await
    }

    pub async fn create(&self, mut item: PendingItem) -> ServiceResult<PendingItemView> {
        let compliance = self.compliance.get(item.compliance_id).await?;
        item.id = None;
        let item = self.repos.pending_items.save(item).await?;
        Ok(PendingItemView { item, compliance })
    }

    pub async fn update(&self, id: PendingItemId, mut item: PendingItem) -> ServiceResult<PendingItemView> {
        self.find(id).await?;
        let compliance = self.compliance.get(item.compliance_id).await?;
        item.id = Some(id);
        let item = self.repos.pending_items.save(item).await?;
        Ok(PendingItemView { item, compliance })
    }

    pub async fn delete(&self, id: PendingItemId) -> ServiceResult<()> {
        if !self.repos.pending_items.exists_by_id(id).await? {
            return Err(DomainError::not_found(NOT_FOUND).into());
        }
        Ok(self.repos.pending_items.delete_by_id(id).await?)
    }

    async fn find(&self, id: PendingItemId) -> ServiceResult<PendingItem> {
        self.repos
            .pending_items
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(NOT_FOUND).into())
    }

    async fn expand(&self, item: PendingItem) -> ServiceResult<PendingItemView> {
        let compliance = self.compliance.get(item.compliance_id).await?;
        Ok(PendingItemView { item, compliance })
    }

    async fn expand_all(&self, items: Vec<PendingItem>) -> ServiceResult<Vec<PendingItemView>> {
        let mut views = Vec::with_capacity(items.len());
        for item in items {
            views.push(self.expand(item).await?);
        }
        Ok(views)
    }
}
