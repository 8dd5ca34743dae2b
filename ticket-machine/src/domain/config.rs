//! Ticket machine configuration snapshot.

use std::collections::HashSet;

use super::error::DomainError;
use super::{PricingDetails, Station, Zone};

/// One complete configuration for a ticket machine, as fetched from the
/// remote service.
///
/// A snapshot is replaced wholesale, never merged: the station list and fare
/// table always come from the same fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineConfig {
    station_name: String,
    station_zone: Zone,
    station_list: Vec<Station>,
    pricing_details: PricingDetails,
}

impl MachineConfig {
    /// Build a snapshot, rejecting a station list that names a station twice.
    pub fn new(
        station_name: impl Into<String>,
        station_zone: Zone,
        station_list: Vec<Station>,
        pricing_details: PricingDetails,
    ) -> Result<Self, DomainError> {
        let mut seen = HashSet::new();
        for station in &station_list {
            if !seen.insert(station.name()) {
                return Err(DomainError::DuplicateStation(station.name().to_string()));
            }
        }

        Ok(Self {
            station_name: station_name.into(),
            station_zone,
            station_list,
            pricing_details,
        })
    }

    /// Name of the station hosting this machine.
    pub fn station_name(&self) -> &str {
        &self.station_name
    }

    /// Zone of the station hosting this machine.
    pub fn station_zone(&self) -> Zone {
        self.station_zone
    }

    pub fn station_list(&self) -> &[Station] {
        &self.station_list
    }

    pub fn pricing_details(&self) -> &PricingDetails {
        &self.pricing_details
    }

    /// Find a station by name.
    pub fn station(&self, name: &str) -> Option<&Station> {
        self.station_list.iter().find(|s| s.name() == name)
    }
}
