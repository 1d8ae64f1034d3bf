use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use verdicomply_core::{AuditId, DepartmentId};

/// An audit carried out against a department on a given date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Audit {
    pub id: Option<AuditId>,
    pub department_id: DepartmentId,
    pub audit_date: Option<NaiveDate>,
    pub auditor: String,
    pub status: Option<String>,
}

impl Audit {
    /// Case-insensitive substring match on the free-text status.
    ///
    /// Audits without a status never match.
    pub fn status_matches(&self, fragment: &str) -> bool {
        match &self.status {
            Some(status) => status.to_lowercase().contains(&fragment.to_lowercase()),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn audit(status: Option<&str>) -> Audit {
        Audit {
            id: Some(AuditId::new(1)),
            department_id: DepartmentId::new(1),
            audit_date: None,
            auditor: "Maria".to_string(),
            status: status.map(str::to_string),
        }
    }

    #[test]
    fn status_match_ignores_case_and_matches_fragments() {
        let a = audit(Some("Em Andamento"));
        assert!(a.status_matches("andamento"));
        assert!(a.status_matches("EM AND"));
        assert!(!a.status_matches("concluída"));
    }

    #[test]
    fn missing_status_never_matches() {
        assert!(!audit(None).status_matches(""));
    }
}
