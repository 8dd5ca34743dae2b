//! Ticket machine service facade.
//!
//! The facade is everything the core needs from the outside world: fetching
//! a machine's configuration, telling the poller when that configuration has
//! gone stale, and turning tickets into strings and back.
//!
//! Two implementations are provided:
//! - [`RestFacade`] talks JSON over HTTP to the ticket machine service
//! - [`MockFacade`] serves configuration from memory or a JSON file

mod client;
mod codec;
mod convert;
mod error;
mod mock;
mod subscribers;
mod types;

pub use client::{RestFacade, RestFacadeConfig};
pub use codec::TicketCodec;
pub use convert::{ConversionError, convert_machine_config};
pub use error::{CodecError, FacadeError};
pub use mock::MockFacade;
pub use subscribers::ChangeSubscribers;
pub use types::{FareDto, MachineConfigDto, PricingDetailsDto, StationDto};

use std::future::Future;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::{DecodedTicket, MachineConfig, MachineId, Ticket, Zone};
use crate::gate;
use crate::poller::RefreshHandle;

/// Remote collaborator consumed by the configuration poller and the gates.
pub trait TicketMachineFacade: Send + Sync + 'static {
    /// Fetch the full configuration for a machine.
    fn fetch_config(
        &self,
        machine_id: &MachineId,
    ) -> impl Future<Output = Result<MachineConfig, FacadeError>> + Send;

    /// Register a handle to be notified, any number of times and from any
    /// thread, whenever configuration is known to be stale.
    fn subscribe_config_changed(&self, handle: RefreshHandle);

    /// Encode and sign a ticket.
    fn encode_ticket(&self, ticket: &Ticket) -> Result<String, CodecError>;

    /// Decode a ticket and check its validation code.
    fn decode_ticket(&self, encoded: &str) -> Result<DecodedTicket, CodecError>;

    /// Decode a presented ticket and decide whether the gate opens.
    ///
    /// A ticket that can't be decoded is refused like any other bad ticket.
    fn verify_gate_access(&self, encoded: &str, gate_zone: Zone, entry_time: DateTime<Utc>) -> bool {
        match self.decode_ticket(encoded) {
            Ok(decoded) => match gate::evaluate(&decoded, gate_zone, entry_time) {
                gate::AccessDecision::Granted => true,
                gate::AccessDecision::Denied(reason) => {
                    debug!(%gate_zone, %reason, "gate access denied");
                    false
                }
            },
            Err(e) => {
                debug!(%gate_zone, error = %e, "gate access denied: undecodable ticket");
                false
            }
        }
    }
}
