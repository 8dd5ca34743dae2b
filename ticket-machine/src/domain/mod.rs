//! Domain types for the ticket machine.
//!
//! These types represent validated configuration and ticket data. Each type
//! enforces its invariants at construction time, so code that receives one
//! can trust it.

mod config;
mod error;
mod machine_id;
mod pricing;
mod station;
mod ticket;

pub use config::MachineConfig;
pub use error::DomainError;
pub use machine_id::{InvalidMachineId, MachineId};
pub use pricing::{Fare, PricingDetails};
pub use station::{InvalidZone, Station, Zone};
pub use ticket::{DecodedTicket, Price, RateBand, Ticket};
