//! Infrastructure layer: repositories over the relational schema.

pub mod repository;
pub mod schema;

pub use repository::{
    AuditRepository, ComplianceLogRepository, ComplianceRecordRepository, CrudRepository,
    DepartmentRepository, InMemoryStore, IntegrityKind, NormRepository, PendingItemRepository,
    PostgresStore, Repositories, StoreError, StoreResult, UserRepository,
};
