//! Fare table.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::{Price, RateBand, Zone};

/// The price of travel between two zones at a given rate band.
///
/// The zone pair is unordered: a fare from zone 1 to zone 3 also covers
/// zone 3 to zone 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fare {
    pub from_zone: Zone,
    pub to_zone: Zone,
    pub rate_band: RateBand,
    pub price: Price,
}

impl Fare {
    /// Lookup key with the zone pair normalised lowest-first.
    fn key(&self) -> (Zone, Zone, RateBand) {
        (
            self.from_zone.min(self.to_zone),
            self.from_zone.max(self.to_zone),
            self.rate_band,
        )
    }
}

/// A complete fare table, as published by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Fare>", into = "Vec<Fare>")]
pub struct PricingDetails {
    fares: Vec<Fare>,
}

impl PricingDetails {
    /// Build a fare table, rejecting two fares for the same journey and band.
    pub fn new(fares: Vec<Fare>) -> Result<Self, DomainError> {
        let mut seen = HashSet::new();
        for fare in &fares {
            let key = fare.key();
            if !seen.insert(key) {
                return Err(DomainError::DuplicateFare(key.0, key.1, key.2));
            }
        }
        Ok(Self { fares })
    }

    /// Look up the fare between two zones, in either direction.
    pub fn fare(&self, a: Zone, b: Zone, rate_band: RateBand) -> Option<Price> {
        let wanted = (a.min(b), a.max(b), rate_band);
        self.fares
            .iter()
            .find(|fare| fare.key() == wanted)
            .map(|fare| fare.price)
    }

    pub fn fares(&self) -> &[Fare] {
        &self.fares
    }

    pub fn len(&self) -> usize {
        self.fares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fares.is_empty()
    }
}

impl TryFrom<Vec<Fare>> for PricingDetails {
    type Error = DomainError;

    fn try_from(fares: Vec<Fare>) -> Result<Self, Self::Error> {
        PricingDetails::new(fares)
    }
}

impl From<PricingDetails> for Vec<Fare> {
    fn from(details: PricingDetails) -> Self {
        details.fares
    }
}
