//! Stations and fare zones.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Error returned when constructing a zone outside the valid range.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid zone {value}: zones start at 1")]
pub struct InvalidZone {
    value: i64,
}

/// A fare zone.
///
/// Zones are numbered from 1 outwards. This type guarantees that any `Zone`
/// value is at least 1.
///
/// # Examples
///
/// ```
/// use ticket_machine::domain::Zone;
///
/// let zone = Zone::new(2).unwrap();
/// assert_eq!(zone.get(), 2);
///
/// // Zone 0 does not exist
/// assert!(Zone::new(0).is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u16")]
pub struct Zone(u16);

impl Zone {
    /// Create a zone from its number.
    pub fn new(value: i64) -> Result<Self, InvalidZone> {
        match u16::try_from(value) {
            Ok(n) if n >= 1 => Ok(Zone(n)),
            _ => Err(InvalidZone { value }),
        }
    }

    /// Returns the zone number.
    pub fn get(self) -> u16 {
        self.0
    }
}

impl TryFrom<i64> for Zone {
    type Error = InvalidZone;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Zone::new(value)
    }
}

impl From<Zone> for u16 {
    fn from(zone: Zone) -> Self {
        zone.0
    }
}

impl fmt::Debug for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Zone({})", self.0)
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A station on the network.
///
/// Two stations are the same station if they have the same name, whatever
/// zone they claim to be in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    name: String,
    zone: Zone,
}

impl Station {
    /// Create a new station.
    pub fn new(name: impl Into<String>, zone: Zone) -> Self {
        Self {
            name: name.into(),
            zone,
        }
    }

    /// Returns the station name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the fare zone the station is in.
    pub fn zone(&self) -> Zone {
        self.zone
    }
}

impl PartialEq for Station {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Station {}

impl Hash for Station {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (zone {})", self.name, self.zone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(n: i64) -> Zone {
        Zone::new(n).unwrap()
    }

    #[test]
    fn zone_bounds() {
        assert!(Zone::new(1).is_ok());
        assert!(Zone::new(9).is_ok());
        assert!(Zone::new(0).is_err());
        assert!(Zone::new(-3).is_err());
        assert!(Zone::new(70_000).is_err());
    }

    #[test]
    fn zone_ordering() {
        assert!(zone(2) < zone(4));
        assert_eq!(zone(3).max(zone(1)), zone(3));
    }

    #[test]
    fn zone_display_and_debug() {
        assert_eq!(zone(4).to_string(), "4");
        assert_eq!(format!("{:?}", zone(4)), "Zone(4)");
    }

    #[test]
    fn zone_serde_rejects_zero() {
        assert_eq!(serde_json::from_str::<Zone>("3").unwrap(), zone(3));
        assert!(serde_json::from_str::<Zone>("0").is_err());
        assert_eq!(serde_json::to_string(&zone(3)).unwrap(), "3");
    }

    #[test]
    fn station_identity_is_name() {
        let a = Station::new("Upney", zone(2));
        let b = Station::new("Upney", zone(3));
        let c = Station::new("Whitechapel", zone(2));
        assert_eq!(a, b);
        assert_ne!(a, c);

        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
        assert!(!set.contains(&c));
    }

    #[test]
    fn station_display() {
        let station = Station::new("Whitechapel", zone(2));
        assert_eq!(station.to_string(), "Whitechapel (zone 2)");
    }
}
