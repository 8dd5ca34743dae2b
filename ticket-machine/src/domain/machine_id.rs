//! Ticket machine identity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an empty machine id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid machine id: must not be empty")]
pub struct InvalidMachineId;

/// The identity a ticket machine is provisioned with.
///
/// Assigned by the remote service (usually a UUID) and treated as opaque.
/// Surrounding whitespace is stripped; an empty id is rejected.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MachineId(String);

impl MachineId {
    /// Parse a machine id.
    pub fn parse(s: &str) -> Result<Self, InvalidMachineId> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(InvalidMachineId);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for MachineId {
    type Error = InvalidMachineId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        MachineId::parse(&value)
    }
}

impl From<MachineId> for String {
    fn from(id: MachineId) -> Self {
        id.0
    }
}

impl fmt::Debug for MachineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MachineId({})", self.0)
    }
}

impl fmt::Display for MachineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims() {
        let id = MachineId::parse("  8c1e-4f  ").unwrap();
        assert_eq!(id.as_str(), "8c1e-4f");
        assert_eq!(id.to_string(), "8c1e-4f");
    }

    #[test]
    fn reject_empty() {
        assert_eq!(MachineId::parse(""), Err(InvalidMachineId));
        assert_eq!(MachineId::parse("   "), Err(InvalidMachineId));
    }

    #[test]
    fn serde_roundtrip_rejects_blank() {
        let id: MachineId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(id.as_str(), "abc");
        assert!(serde_json::from_str::<MachineId>("\" \"").is_err());
    }
}
