//! Strongly-typed identifiers used across the domain.
//!
//! Records are keyed by database-generated sequence values, so every id wraps an `i64`.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

macro_rules! define_id {
    ($(#[$meta:meta])* $t:ident, $name:literal) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $t(i64);

        impl $t {
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            pub const fn value(&self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i64> for $t {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$t> for i64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = s
                    .trim()
                    .parse::<i64>()
                    .map_err(|e| DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                Ok(Self(value))
            }
        }
    };
}

define_id!(
    /// Identifier of a department.
    DepartmentId,
    "DepartmentId"
);
define_id!(
    /// Identifier of an audit.
    AuditId,
    "AuditId"
);
define_id!(
    /// Identifier of an environmental norm.
    NormId,
    "NormId"
);
define_id!(
    /// Identifier of a compliance record (audit finding against a norm).
    ComplianceId,
    "ComplianceId"
);
define_id!(PendingItemId, "PendingItemId");
define_id!(ComplianceLogId, "ComplianceLogId");
define_id!(UserId, "UserId");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numeric_ids() {
        assert_eq!("42".parse::<AuditId>().unwrap(), AuditId::new(42));
        assert_eq!(" 7 ".parse::<NormId>().unwrap().value(), 7);
    }

    #[test]
    fn rejects_non_numeric_ids() {
        let err = "abc".parse::<DepartmentId>().unwrap_err();
        assert!(matches!(err, DomainError::InvalidId(msg) if msg.starts_with("DepartmentId")));
    }
}
