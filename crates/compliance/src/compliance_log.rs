use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use verdicomply_core::{ComplianceId, ComplianceLogId};

/// Audit-trail entry recording an action taken on a compliance record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceLog {
    pub id: Option<ComplianceLogId>,
    pub compliance_id: ComplianceId,
    pub action: String,
    pub recorded_on: NaiveDate,
    pub details: Option<String>,
}

/// Sort entries newest first; ties keep the higher id first.
pub fn sort_newest_first(logs: &mut [ComplianceLog]) {
    logs.sort_by(|a, b| b.recorded_on.cmp(&a.recorded_on).then_with(|| b.id.cmp(&a.id)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log(id: i64, day: u32) -> ComplianceLog {
        ComplianceLog {
            id: Some(ComplianceLogId::new(id)),
            compliance_id: ComplianceId::new(1),
            action: "REVISAO".to_string(),
            recorded_on: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            details: None,
        }
    }

    #[test]
    fn newest_entries_come_first() {
        let mut logs = vec![log(1, 2), log(2, 9), log(3, 9), log(4, 1)];
        sort_newest_first(&mut logs);
        let ids: Vec<i64> = logs.iter().map(|l| l.id.unwrap().value()).collect();
        assert_eq!(ids, vec![3, 2, 1, 4]);
    }
}
