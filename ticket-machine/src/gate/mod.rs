//! Gate access decisions.
//!
//! Decides whether a decoded ticket lets its holder through a gate in a
//! given zone at a given time. Everything here is a pure function of its
//! arguments, so any number of gates can call it concurrently.
//!
//! A ticket is accepted only if all three hold:
//! - its validation code matches its contents
//! - the gate's zone lies between the start and destination zones
//! - the entry time lies inside the validity window (inclusive)

use std::fmt;

use chrono::{DateTime, Utc};

use crate::domain::{DecodedTicket, Zone};

/// Why a gate stayed shut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// Validation code does not match the ticket contents
    InvalidSignature,

    /// Gate zone is outside the zones the ticket covers
    OutsideZones { gate: Zone, lowest: Zone, highest: Zone },

    /// Entry is before the ticket becomes valid
    NotYetValid,

    /// Entry is after the ticket stops being valid
    Expired,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenyReason::InvalidSignature => write!(f, "validation code mismatch"),
            DenyReason::OutsideZones {
                gate,
                lowest,
                highest,
            } => write!(f, "gate zone {gate} outside ticket zones {lowest}-{highest}"),
            DenyReason::NotYetValid => write!(f, "ticket not yet valid"),
            DenyReason::Expired => write!(f, "ticket expired"),
        }
    }
}

/// Outcome of presenting a ticket at a gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Granted,
    Denied(DenyReason),
}

impl AccessDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, AccessDecision::Granted)
    }
}

/// Evaluate a ticket at a gate, reporting why it was refused.
///
/// The tamper check runs first; nothing else about a ticket with a bad
/// validation code is trusted.
pub fn evaluate(
    decoded: &DecodedTicket,
    gate_zone: Zone,
    entry_time: DateTime<Utc>,
) -> AccessDecision {
    if !decoded.signature_valid {
        return AccessDecision::Denied(DenyReason::InvalidSignature);
    }

    let ticket = &decoded.ticket;

    let zones = ticket.zone_range();
    if !zones.contains(&gate_zone) {
        return AccessDecision::Denied(DenyReason::OutsideZones {
            gate: gate_zone,
            lowest: *zones.start(),
            highest: *zones.end(),
        });
    }

    if entry_time < ticket.valid_from() {
        return AccessDecision::Denied(DenyReason::NotYetValid);
    }
    if entry_time > ticket.valid_to() {
        return AccessDecision::Denied(DenyReason::Expired);
    }

    AccessDecision::Granted
}

/// Whether the gate should open.
pub fn check_access(decoded: &DecodedTicket, gate_zone: Zone, entry_time: DateTime<Utc>) -> bool {
    evaluate(decoded, gate_zone, entry_time).is_granted()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::{Price, RateBand, Station, Ticket};
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap()
    }

    fn minutes(n: i64) -> DateTime<Utc> {
        base() + chrono::Duration::minutes(n)
    }

    fn decoded(
        start: i64,
        dest: i64,
        from: i64,
        to: i64,
        signature_valid: bool,
    ) -> DecodedTicket {
        let ticket = Ticket::new(
            minutes(from),
            minutes(to),
            RateBand::Peak,
            Price::from_pence(280),
            Station::new("Start", Zone::new(start).unwrap()),
            Station::new("Dest", Zone::new(dest).unwrap()),
        )
        .unwrap();
        DecodedTicket::new(ticket, signature_valid)
    }

    /// (start zone, dest zone, gate zone within them)
    fn journey_with_gate_inside() -> impl Strategy<Value = (i64, i64, i64)> {
        (1i64..=9, 1i64..=9).prop_flat_map(|(s, d)| (Just(s), Just(d), s.min(d)..=s.max(d)))
    }

    /// (valid from, valid to, entry within them) in minutes after midnight
    fn window_with_entry_inside() -> impl Strategy<Value = (i64, i64, i64)> {
        (0i64..1440, 0i64..1440).prop_flat_map(|(a, b)| {
            let (from, to) = (a.min(b), a.max(b));
            (Just(from), Just(to), from..=to)
        })
    }

    proptest! {
        /// Good signature, gate in range, entry in window: always granted
        #[test]
        fn grants_when_all_checks_pass(
            (start, dest, gate) in journey_with_gate_inside(),
            (from, to, entry) in window_with_entry_inside(),
        ) {
            let t = decoded(start, dest, from, to, true);
            prop_assert!(check_access(&t, Zone::new(gate).unwrap(), minutes(entry)));
        }

        /// A bad signature is denied whatever the zone and time
        #[test]
        fn tampered_always_denied(
            start in 1i64..=9,
            dest in 1i64..=9,
            gate in 1i64..=9,
            (from, to) in (0i64..1440, 0i64..1440).prop_map(|(a, b)| (a.min(b), a.max(b))),
            entry in -60i64..1500,
        ) {
            let t = decoded(start, dest, from, to, false);
            prop_assert!(!check_access(&t, Zone::new(gate).unwrap(), minutes(entry)));
        }

        /// Swapping start and destination never changes the decision
        #[test]
        fn zone_check_is_symmetric(
            start in 1i64..=9,
            dest in 1i64..=9,
            gate in 1i64..=9,
            entry in 0i64..120,
        ) {
            let outbound = decoded(start, dest, 0, 120, true);
            let inbound = decoded(dest, start, 0, 120, true);
            let gate = Zone::new(gate).unwrap();
            prop_assert_eq!(
                check_access(&outbound, gate, minutes(entry)),
                check_access(&inbound, gate, minutes(entry))
            );
        }

        /// Gates outside the journey's zones are always denied
        #[test]
        fn gate_outside_range_denied(
            start in 2i64..=8,
            dest in 2i64..=8,
            below in proptest::bool::ANY,
        ) {
            let t = decoded(start, dest, 0, 120, true);
            let gate = if below { start.min(dest) - 1 } else { start.max(dest) + 1 };
            prop_assert!(!check_access(&t, Zone::new(gate).unwrap(), minutes(60)));
        }
    }
}
