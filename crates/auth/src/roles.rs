use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use verdicomply_core::DomainError;

const AUTHORITY_PREFIX: &str = "ROLE_";

/// Access profile granted to a user.
///
/// Stored as the bare name (`ADMIN`) and exposed to clients as a granted
/// authority (`ROLE_ADMIN`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    Gestor,
    Auditor,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Gestor, Role::Auditor];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Gestor => "GESTOR",
            Role::Auditor => "AUDITOR",
        }
    }

    pub fn authority(&self) -> String {
        format!("{AUTHORITY_PREFIX}{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    /// Accepts both the bare name and the `ROLE_`-prefixed authority.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.strip_prefix(AUTHORITY_PREFIX).unwrap_or(s);
        match name {
            "ADMIN" => Ok(Role::Admin),
            "GESTOR" => Ok(Role::Gestor),
            "AUDITOR" => Ok(Role::Auditor),
            _ => Err(DomainError::validation(format!("unknown role '{s}'"))),
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.authority())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_and_prefixed_names() {
        assert_eq!("GESTOR".parse::<Role>().unwrap(), Role::Gestor);
        assert_eq!("ROLE_AUDITOR".parse::<Role>().unwrap(), Role::Auditor);
        assert!("admin".parse::<Role>().is_err());
        assert!("ROLE_".parse::<Role>().is_err());
    }

    #[test]
    fn serializes_as_authority() {
        let json = serde_json::to_string(&vec![Role::Admin, Role::Auditor]).unwrap();
        assert_eq!(json, r#"["ROLE_ADMIN","ROLE_AUDITOR"]"#);
    }
}
