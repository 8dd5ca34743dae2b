//! Domain error types.
//!
//! These errors represent validation failures in the domain layer. They are
//! distinct from transport and storage errors.

use chrono::{DateTime, Utc};

use super::{RateBand, Zone};

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Ticket validity window ends before it starts
    #[error("ticket valid from {from} must not be after valid to {to}")]
    InvertedValidity {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },

    /// Station list names the same station twice
    #[error("duplicate station in station list: {0}")]
    DuplicateStation(String),

    /// Fare table has two prices for the same journey and rate band
    #[error("duplicate fare for zones {0}-{1} at {2}")]
    DuplicateFare(Zone, Zone, RateBand),
}
