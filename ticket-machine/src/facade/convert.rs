//! Conversion from wire DTOs to domain types.

use crate::domain::{DomainError, Fare, MachineConfig, Price, PricingDetails, Station, Zone};

use super::types::{FareDto, MachineConfigDto, PricingDetailsDto, StationDto};

/// Error during DTO to domain conversion.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConversionError {
    /// Zone number out of range
    #[error("invalid zone {zone} for {context}")]
    InvalidZone { zone: i64, context: String },

    /// Price is negative or not a number
    #[error("invalid price {0}")]
    InvalidPrice(f64),

    /// Station with an empty name
    #[error("station with empty name")]
    EmptyStationName,

    /// Converted values break a domain invariant
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Convert a configuration response to a validated snapshot.
pub fn convert_machine_config(dto: &MachineConfigDto) -> Result<MachineConfig, ConversionError> {
    let station_zone = zone(dto.station_zone, &dto.station_name)?;

    let stations = dto
        .station_list
        .iter()
        .map(convert_station)
        .collect::<Result<Vec<_>, _>>()?;

    let pricing = convert_pricing(&dto.pricing_details)?;

    Ok(MachineConfig::new(
        dto.station_name.clone(),
        station_zone,
        stations,
        pricing,
    )?)
}

pub fn convert_station(dto: &StationDto) -> Result<Station, ConversionError> {
    let name = dto.name.trim();
    if name.is_empty() {
        return Err(ConversionError::EmptyStationName);
    }
    Ok(Station::new(name, zone(dto.zone, name)?))
}

pub fn convert_pricing(dto: &PricingDetailsDto) -> Result<PricingDetails, ConversionError> {
    let fares = dto
        .fares
        .iter()
        .map(convert_fare)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(PricingDetails::new(fares)?)
}

fn convert_fare(dto: &FareDto) -> Result<Fare, ConversionError> {
    Ok(Fare {
        from_zone: zone(dto.from_zone, "fare")?,
        to_zone: zone(dto.to_zone, "fare")?,
        rate_band: dto.rate_band,
        price: pounds_to_price(dto.price)?,
    })
}

/// Convert a price in pounds to whole pence, rounding to the nearest penny.
pub(crate) fn pounds_to_price(pounds: f64) -> Result<Price, ConversionError> {
    if !pounds.is_finite() || pounds < 0.0 {
        return Err(ConversionError::InvalidPrice(pounds));
    }
    Ok(Price::from_pence((pounds * 100.0).round() as u64))
}

fn zone(value: i64, context: &str) -> Result<Zone, ConversionError> {
    Zone::new(value).map_err(|_| ConversionError::InvalidZone {
        zone: value,
        context: context.to_string(),
    })
}
