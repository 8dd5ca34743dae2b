//! Process settings read from the environment.

use std::path::PathBuf;

use crate::domain::{InvalidMachineId, MachineId};
use crate::facade::RestFacadeConfig;
use crate::poller::PollerConfig;

/// Problem with an environment variable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("{var} must be a whole number of seconds, got {value:?}")]
    InvalidSeconds { var: &'static str, value: String },

    #[error("{var} must be greater than zero")]
    Zero { var: &'static str },

    #[error("TICKET_MACHINE_UUID: {0}")]
    MachineId(#[from] InvalidMachineId),
}

/// Everything the binary needs to start.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Remote service; ignored when `mock_config` is set
    pub facade: RestFacadeConfig,

    /// Id this machine was provisioned with, if provisioned yet
    pub machine_id: Option<MachineId>,

    pub poller: PollerConfig,

    /// Where to keep the last good configuration; in memory only when unset
    pub data_dir: Option<PathBuf>,

    /// Serve configuration from this JSON file instead of the service
    pub mock_config: Option<PathBuf>,
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read settings through `lookup`, which returns a variable's value if set.
    ///
    /// Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let mut facade = match get("TICKET_MACHINE_URL") {
            Some(url) => RestFacadeConfig::new(url),
            None => RestFacadeConfig::default(),
        };
        if let Some(secret) = get("TICKET_SECRET") {
            facade = facade.with_secret(secret);
        }
        if let Some(secs) = seconds(&get, "HTTP_TIMEOUT_SECS")? {
            facade = facade.with_timeout(non_zero("HTTP_TIMEOUT_SECS", secs)?);
        }

        let machine_id = get("TICKET_MACHINE_UUID")
            .map(|id| MachineId::parse(&id))
            .transpose()?;

        let defaults = PollerConfig::default();
        let poller = PollerConfig::new(
            seconds(&get, "POLL_INITIAL_DELAY_SECS")?.unwrap_or(defaults.initial_delay_secs),
            match seconds(&get, "POLL_PERIOD_SECS")? {
                Some(secs) => non_zero("POLL_PERIOD_SECS", secs)?,
                None => defaults.period_secs,
            },
        );

        Ok(Self {
            facade,
            machine_id,
            poller,
            data_dir: get("TICKET_MACHINE_DATA_DIR").map(PathBuf::from),
            mock_config: get("TICKET_MACHINE_MOCK_CONFIG").map(PathBuf::from),
        })
    }

    /// Station store file inside the data directory.
    pub fn stations_path(&self) -> Option<PathBuf> {
        self.data_dir.as_ref().map(|dir| dir.join("stations.json"))
    }

    /// Fare table file inside the data directory.
    pub fn pricing_path(&self) -> Option<PathBuf> {
        self.data_dir.as_ref().map(|dir| dir.join("pricing.json"))
    }
}

fn seconds(
    get: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<u64>, SettingsError> {
    get(var)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| SettingsError::InvalidSeconds { var, value })
        })
        .transpose()
}

fn non_zero(var: &'static str, secs: u64) -> Result<u64, SettingsError> {
    if secs == 0 {
        Err(SettingsError::Zero { var })
    } else {
        Ok(secs)
    }
}
