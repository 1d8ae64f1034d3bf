//! `verdicomply-compliance`: environmental-compliance records.
//!
//! Plain data types for departments, audits, norms, compliance findings, their
//! pending remediation items and log entries. Persistence lives in `verdicomply-infra`.

pub mod audit;
pub mod catalog;
pub mod compliance_log;
pub mod compliance_record;
pub mod department;
pub mod norm;
pub mod pending_item;

pub use audit::Audit;
pub use compliance_log::ComplianceLog;
pub use compliance_record::ComplianceRecord;
pub use department::Department;
pub use norm::EnvironmentalNorm;
pub use pending_item::PendingItem;
