use serde::{Deserialize, Serialize};

use verdicomply_core::{AuditId, ComplianceId, Flag, NormId};

/// Finding of an audit against one norm: conforming (`S`) or not (`N`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceRecord {
    pub id: Option<ComplianceId>,
    pub audit_id: AuditId,
    pub norm_id: NormId,
    pub compliant: Flag,
    pub notes: Option<String>,
}

impl ComplianceRecord {
    pub fn is_compliant(&self) -> bool {
        self.compliant.is_set()
    }
}
