//! Local storage for the station directory and fare table.
//!
//! Both stores are replaced wholesale from each configuration snapshot:
//! `replace_all` clears the old contents and writes the new ones, and a
//! failed replace leaves the old contents readable.

mod error;
mod file;
mod memory;

pub use error::StoreError;
pub use file::{FilePricingStore, FileStationStore};
pub use memory::{MemoryPricingStore, MemoryStationStore};

use crate::domain::{PricingDetails, Station};

/// Station directory storage.
pub trait StationStore: Send + Sync {
    /// Replace every stored station with `stations`.
    fn replace_all(&self, stations: &[Station]) -> Result<(), StoreError>;

    /// Read back the stored stations. Empty if nothing has been stored.
    fn load(&self) -> Result<Vec<Station>, StoreError>;
}

/// Fare table storage.
pub trait PricingStore: Send + Sync {
    /// Replace the stored fare table with `details`.
    fn replace_all(&self, details: &PricingDetails) -> Result<(), StoreError>;

    /// Read back the stored fare table, if one has been stored.
    fn load(&self) -> Result<Option<PricingDetails>, StoreError>;
}
