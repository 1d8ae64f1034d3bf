//! `verdicomply-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod flag;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use flag::Flag;
pub use id::{AuditId, ComplianceId, ComplianceLogId, DepartmentId, NormId, PendingItemId, UserId};
