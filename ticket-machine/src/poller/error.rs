//! Poller error types.

use crate::facade::FacadeError;
use crate::store::StoreError;

/// Why a refresh didn't apply a new configuration.
#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    /// Fetching from the remote service failed
    #[error("fetch failed: {0}")]
    Fetch(#[from] FacadeError),

    /// Writing the fetched configuration to storage failed
    #[error("storage write failed: {0}")]
    Store(#[from] StoreError),
}

/// Errors from poller lifecycle operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PollerError {
    /// Poller created outside a Tokio runtime
    #[error("configuration poller must be created inside a Tokio runtime")]
    NoRuntime,

    /// A zero poll period would spin
    #[error("poll period must be greater than zero")]
    ZeroPeriod,

    /// Poller has been shut down and cannot be re-armed
    #[error("configuration poller has been shut down")]
    ShutDown,
}
