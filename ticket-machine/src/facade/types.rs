//! Wire DTOs for the ticket machine service.
//!
//! These types map directly to the service's JSON. They carry raw numbers
//! and strings; conversion to validated domain types happens in `convert`.

use serde::{Deserialize, Serialize};

use crate::domain::RateBand;

/// Response from `GET /ticketMachineConfig`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineConfigDto {
    /// Name of the station the machine is installed at.
    pub station_name: String,

    /// Zone of that station.
    pub station_zone: i64,

    /// Every station on the network, in display order.
    #[serde(default)]
    pub station_list: Vec<StationDto>,

    /// Current fare table.
    #[serde(default)]
    pub pricing_details: PricingDetailsDto,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationDto {
    pub name: String,
    pub zone: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingDetailsDto {
    #[serde(default)]
    pub fares: Vec<FareDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FareDto {
    pub from_zone: i64,
    pub to_zone: i64,
    pub rate_band: RateBand,

    /// Price in pounds, e.g. `4.5`.
    pub price: f64,
}
