//! Single-character `S`/`N` flag stored in compliance records and pending items.

use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DomainError;

/// Yes/no flag persisted as `'S'` (sim) or `'N'` (não).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Flag {
    Sim,
    Nao,
}

impl Flag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Flag::Sim => "S",
            Flag::Nao => "N",
        }
    }

    pub fn is_set(&self) -> bool {
        matches!(self, Flag::Sim)
    }
}

impl FromStr for Flag {
    type Err = DomainError;

    /// Only the exact uppercase letters are accepted, matching the column check.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "S" => Ok(Flag::Sim),
            "N" => Ok(Flag::Nao),
            other => Err(DomainError::validation(format!(
                "flag must be 'S' or 'N', got '{other}'"
            ))),
        }
    }
}

impl core::fmt::Display for Flag {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Flag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Flag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
