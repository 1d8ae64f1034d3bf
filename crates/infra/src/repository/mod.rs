//! Repository boundary over the compliance tables.
//!
//! Services depend on the traits in [`r#trait`] only; [`InMemoryStore`] backs
//! dev/tests and [`PostgresStore`] backs persistent deployments. Both enforce the
//! same referential rules so behaviour does not change with the backend.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

use std::sync::Arc;

pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use r#trait::{
    AuditRepository, ComplianceLogRepository, ComplianceRecordRepository, CrudRepository,
    DepartmentRepository, IntegrityKind, NormRepository, PendingItemRepository, StoreError,
    StoreResult, UserRepository,
};

/// Every repository the application needs, behind trait objects.
#[derive(Clone)]
pub struct Repositories {
    pub departments: Arc<dyn DepartmentRepository>,
    pub audits: Arc<dyn AuditRepository>,
    pub norms: Arc<dyn NormRepository>,
    pub compliance: Arc<dyn ComplianceRecordRepository>,
    pub pending_items: Arc<dyn PendingItemRepository>,
    pub logs: Arc<dyn ComplianceLogRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Repositories {
    /// Wire every repository to one shared store instance.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: DepartmentRepository
            + AuditRepository
            + NormRepository
            + ComplianceRecordRepository
            + PendingItemRepository
            + ComplianceLogRepository
            + UserRepository
            + 'static,
    {
        Self {
            departments: store.clone(),
            audits: store.clone(),
            norms: store.clone(),
            compliance: store.clone(),
            pending_items: store.clone(),
            logs: store.clone(),
            users: store,
        }
    }

    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(InMemoryStore::new()))
    }
}
