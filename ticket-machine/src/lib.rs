//! Ticket machine client.
//!
//! Keeps a station ticket machine's configuration (its station, the network
//! station list and the fare table) fresh from the remote ticket machine
//! service, and decides at the gates whether a presented ticket lets its
//! holder through.

pub mod domain;
pub mod facade;
pub mod gate;
pub mod poller;
pub mod settings;
pub mod store;
