use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use verdicomply_auth::UserAccount;
use verdicomply_compliance::{
    Audit, ComplianceLog, ComplianceRecord, Department, EnvironmentalNorm, PendingItem,
};
use verdicomply_core::{
    AuditId, ComplianceId, ComplianceLogId, DepartmentId, Flag, NormId, PendingItemId,
};

/// Which relational rule a write broke.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum IntegrityKind {
    /// A referenced parent is missing, or a delete would orphan children.
    ForeignKey,
    /// A unique column already holds the value.
    Unique,
    /// Not-null, check or length constraint.
    Other,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("integrity violation ({0:?})")]
    Integrity(IntegrityKind),

    /// An update targeted an id with no row behind it.
    #[error("row not found")]
    NotFound,

    #[error("storage backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Operations every table supports.
///
/// `save` inserts when the entity has no id yet and overwrites otherwise,
/// returning the stored row with its id assigned.
#[async_trait]
pub trait CrudRepository<T, I>: Send + Sync
where
    T: Send + 'static,
    I: Send + 'static,
{
    async fn find_all(&self) -> StoreResult<Vec<T>>;
    async fn find_by_id(&self, id: I) -> StoreResult<Option<T>>;
    async fn save(&self, entity: T) -> StoreResult<T>;
    async fn exists_by_id(&self, id: I) -> StoreResult<bool>;
    async fn delete_by_id(&self, id: I) -> StoreResult<()>;
}

#[async_trait]
pub trait DepartmentRepository: CrudRepository<Department, DepartmentId> {}

#[async_trait]
pub trait AuditRepository: CrudRepository<Audit, AuditId> {
    async fn find_by_department(&self, department_id: DepartmentId) -> StoreResult<Vec<Audit>>;

    /// Case-insensitive "contains" match on the status text.
    async fn find_by_status_containing(&self, fragment: &str) -> StoreResult<Vec<Audit>>;
}

#[async_trait]
pub trait NormRepository: CrudRepository<EnvironmentalNorm, NormId> {
    async fn find_by_code(&self, code: &str) -> StoreResult<Option<EnvironmentalNorm>>;
    async fn find_by_agency(&self, agency: &str) -> StoreResult<Vec<EnvironmentalNorm>>;
    async fn exists_by_code(&self, code: &str) -> StoreResult<bool>;
}

#[async_trait]
pub trait ComplianceRecordRepository: CrudRepository<ComplianceRecord, ComplianceId> {
    async fn find_by_audit(&self, audit_id: AuditId) -> StoreResult<Vec<ComplianceRecord>>;
    async fn find_by_flag(&self, compliant: Flag) -> StoreResult<Vec<ComplianceRecord>>;
    async fn find_by_norm(&self, norm_id: NormId) -> StoreResult<Vec<ComplianceRecord>>;
}

#[async_trait]
pub trait PendingItemRepository: CrudRepository<PendingItem, PendingItemId> {
    async fn find_by_compliance(&self, compliance_id: ComplianceId) -> StoreResult<Vec<PendingItem>>;
    async fn find_by_resolved(&self, resolved: Flag) -> StoreResult<Vec<PendingItem>>;

    /// Unresolved items whose deadline is strictly before `reference`.
    async fn find_overdue(&self, reference: NaiveDate) -> StoreResult<Vec<PendingItem>>;
}

#[async_trait]
pub trait ComplianceLogRepository: CrudRepository<ComplianceLog, ComplianceLogId> {
    /// Entries for one record, newest first.
    async fn find_by_compliance(&self, compliance_id: ComplianceId) -> StoreResult<Vec<ComplianceLog>>;
    async fn find_by_action(&self, action: &str) -> StoreResult<Vec<ComplianceLog>>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<UserAccount>>;
    async fn exists_by_username(&self, username: &str) -> StoreResult<bool>;
    async fn save_user(&self, user: UserAccount) -> StoreResult<UserAccount>;
}
