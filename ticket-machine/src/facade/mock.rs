//! Mock facade for running without the remote service.
//!
//! Serves one or more fixed configurations, optionally loaded from a JSON
//! file in the same shape the service returns. Useful for development and
//! for exercising the poller in tests.

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::domain::{DecodedTicket, MachineConfig, MachineId, Ticket};
use crate::poller::RefreshHandle;

use super::TicketMachineFacade;
use super::codec::TicketCodec;
use super::convert::convert_machine_config;
use super::error::{CodecError, FacadeError};
use super::subscribers::ChangeSubscribers;
use super::types::MachineConfigDto;

/// Mock facade that serves configuration from memory.
///
/// Each fetch returns the next configuration in turn, cycling back to the
/// first. With no configurations, or while failing is switched on, fetches
/// fail with a 503.
#[derive(Debug)]
pub struct MockFacade {
    configs: Mutex<Vec<MachineConfig>>,
    fetches: AtomicUsize,
    failing: AtomicBool,
    latency: Option<Duration>,
    codec: TicketCodec,
    subscribers: ChangeSubscribers,
}

impl MockFacade {
    /// Create a mock that serves the given configurations in turn.
    pub fn new(configs: Vec<MachineConfig>) -> Self {
        Self {
            configs: Mutex::new(configs),
            fetches: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
            latency: None,
            codec: TicketCodec::new("mock-secret"),
            subscribers: ChangeSubscribers::new(),
        }
    }

    /// Load a single configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FacadeError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| FacadeError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let dto: MachineConfigDto = serde_json::from_str(&json).map_err(|e| FacadeError::Json {
            message: format!("Failed to parse {:?}: {}", path, e),
            body: None,
        })?;

        Ok(Self::new(vec![convert_machine_config(&dto)?]))
    }

    /// Delay every fetch by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Use a specific ticket signing secret.
    pub fn with_secret(mut self, secret: impl Into<Vec<u8>>) -> Self {
        self.codec = TicketCodec::new(secret);
        self
    }

    /// Make subsequent fetches fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Replace the configurations served.
    pub fn set_configs(&self, configs: Vec<MachineConfig>) {
        *self.configs.lock().unwrap_or_else(PoisonError::into_inner) = configs;
    }

    /// Number of fetches attempted so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Notify subscribers that configuration changed.
    pub fn notify_config_changed(&self) -> usize {
        self.subscribers.notify_all()
    }

    fn pick(&self, n: usize) -> Option<MachineConfig> {
        if self.failing.load(Ordering::SeqCst) {
            return None;
        }
        let configs = self.configs.lock().unwrap_or_else(PoisonError::into_inner);
        (!configs.is_empty()).then(|| configs[n % configs.len()].clone())
    }
}

impl TicketMachineFacade for MockFacade {
    async fn fetch_config(&self, _machine_id: &MachineId) -> Result<MachineConfig, FacadeError> {
        let n = self.fetches.fetch_add(1, Ordering::SeqCst);

        // Pick the response before the simulated network delay.
        let picked = self.pick(n);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        picked.ok_or_else(|| FacadeError::Api {
            status: 503,
            message: "mock configured to fail".to_string(),
        })
    }

    fn subscribe_config_changed(&self, handle: RefreshHandle) {
        self.subscribers.subscribe(handle);
    }

    fn encode_ticket(&self, ticket: &Ticket) -> Result<String, CodecError> {
        self.codec.encode(ticket)
    }

    fn decode_ticket(&self, encoded: &str) -> Result<DecodedTicket, CodecError> {
        self.codec.decode(encoded)
    }
}
