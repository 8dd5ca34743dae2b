//! Poll schedule configuration.

use std::time::Duration;

/// How often the poller fetches configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollerConfig {
    /// Delay before the first scheduled fetch (seconds).
    pub initial_delay_secs: u64,

    /// Time between scheduled fetches (seconds).
    pub period_secs: u64,
}

impl PollerConfig {
    pub fn new(initial_delay_secs: u64, period_secs: u64) -> Self {
        Self {
            initial_delay_secs,
            period_secs,
        }
    }

    /// Returns the initial delay as a Duration.
    pub fn initial_delay(&self) -> Duration {
        Duration::from_secs(self.initial_delay_secs)
    }

    /// Returns the poll period as a Duration.
    pub fn period(&self) -> Duration {
        Duration::from_secs(self.period_secs)
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            initial_delay_secs: 5,
            period_secs: 60,
        }
    }
}
