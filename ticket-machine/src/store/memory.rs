//! In-memory stores.

use std::sync::RwLock;

use crate::domain::{PricingDetails, Station};

use super::{PricingStore, StationStore, StoreError};

/// Station store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStationStore {
    stations: RwLock<Vec<Station>>,
}

impl MemoryStationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StationStore for MemoryStationStore {
    fn replace_all(&self, stations: &[Station]) -> Result<(), StoreError> {
        let mut guard = self.stations.write().map_err(|_| StoreError::Poisoned)?;
        *guard = stations.to_vec();
        Ok(())
    }

    fn load(&self) -> Result<Vec<Station>, StoreError> {
        let guard = self.stations.read().map_err(|_| StoreError::Poisoned)?;
        Ok(guard.clone())
    }
}

/// Fare table store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryPricingStore {
    details: RwLock<Option<PricingDetails>>,
}

impl MemoryPricingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PricingStore for MemoryPricingStore {
    fn replace_all(&self, details: &PricingDetails) -> Result<(), StoreError> {
        let mut guard = self.details.write().map_err(|_| StoreError::Poisoned)?;
        *guard = Some(details.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<PricingDetails>, StoreError> {
        let guard = self.details.read().map_err(|_| StoreError::Poisoned)?;
        Ok(guard.clone())
    }
}
