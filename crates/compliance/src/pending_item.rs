use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use verdicomply_core::{ComplianceId, Flag, PendingItemId};

/// Remediation item raised from a compliance finding, due by `due_date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingItem {
    pub id: Option<PendingItemId>,
    pub compliance_id: ComplianceId,
    pub description: String,
    pub due_date: NaiveDate,
    pub resolved: Flag,
}

impl PendingItem {
    /// Unresolved and past its deadline relative to `reference`.
    ///
    /// An item due exactly on `reference` is not yet overdue.
    pub fn is_overdue(&self, reference: NaiveDate) -> bool {
        !self.resolved.is_set() && self.due_date < reference
    }
}
