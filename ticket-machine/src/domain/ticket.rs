//! Tickets and the fares they are sold at.

use std::fmt;
use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::{Station, Zone};

/// Fare category a ticket was sold under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RateBand {
    Peak,
    OffPeak,
}

impl fmt::Display for RateBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateBand::Peak => f.write_str("peak"),
            RateBand::OffPeak => f.write_str("off-peak"),
        }
    }
}

/// A non-negative amount of money, held in pence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(u64);

impl Price {
    /// Create a price from a whole number of pence.
    pub fn from_pence(pence: u64) -> Self {
        Self(pence)
    }

    /// Returns the price in pence.
    pub fn pence(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "£{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// An issued ticket.
///
/// A ticket is valid between `valid_from` and `valid_to` inclusive, for
/// travel through every zone between its start and destination stations.
/// Construction rejects a window that ends before it starts. Fields are
/// private: once issued, a ticket cannot be changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    valid_from: DateTime<Utc>,
    valid_to: DateTime<Utc>,
    rate_band: RateBand,
    price: Price,
    start_station: Station,
    dest_station: Station,
}

impl Ticket {
    /// Issue a new ticket.
    pub fn new(
        valid_from: DateTime<Utc>,
        valid_to: DateTime<Utc>,
        rate_band: RateBand,
        price: Price,
        start_station: Station,
        dest_station: Station,
    ) -> Result<Self, DomainError> {
        if valid_from > valid_to {
            return Err(DomainError::InvertedValidity {
                from: valid_from,
                to: valid_to,
            });
        }

        Ok(Self {
            valid_from,
            valid_to,
            rate_band,
            price,
            start_station,
            dest_station,
        })
    }

    pub fn valid_from(&self) -> DateTime<Utc> {
        self.valid_from
    }

    pub fn valid_to(&self) -> DateTime<Utc> {
        self.valid_to
    }

    pub fn rate_band(&self) -> RateBand {
        self.rate_band
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn start_station(&self) -> &Station {
        &self.start_station
    }

    pub fn dest_station(&self) -> &Station {
        &self.dest_station
    }

    /// Zones this ticket covers, lowest first.
    ///
    /// Independent of travel direction: a ticket from zone 4 to zone 2
    /// covers the same zones as one from zone 2 to zone 4.
    pub fn zone_range(&self) -> RangeInclusive<Zone> {
        let a = self.start_station.zone();
        let b = self.dest_station.zone();
        a.min(b)..=a.max(b)
    }

    /// Whether `at` falls inside the validity window (both ends inclusive).
    pub fn is_valid_at(&self, at: DateTime<Utc>) -> bool {
        self.valid_from <= at && at <= self.valid_to
    }
}

/// A ticket as read back at a gate, with the result of its tamper check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedTicket {
    pub ticket: Ticket,

    /// Whether the carried validation code matches the ticket contents.
    pub signature_valid: bool,
}

impl DecodedTicket {
    pub fn new(ticket: Ticket, signature_valid: bool) -> Self {
        Self {
            ticket,
            signature_valid,
        }
    }
}
