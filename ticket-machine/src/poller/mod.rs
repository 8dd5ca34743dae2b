//! Configuration poller.
//!
//! Keeps the machine's configuration fresh. A refresh fetches the full
//! configuration for this machine and, if that succeeds, replaces the
//! station and fare stores and the poller's cached snapshot. Refreshes are
//! triggered by a fixed-period schedule and by "configuration changed"
//! notifications from the facade.
//!
//! Refreshes never overlap: a single gate serializes fetch-and-apply, so two
//! triggers arriving together run one after the other and the last to finish
//! decides the cached snapshot. A failed refresh leaves everything as it was.
//!
//! Lifecycle is `Created -> Armed -> ShutDown`, with `Created -> ShutDown`
//! also allowed. Shutdown is terminal.

mod config;
mod error;
mod handle;


pub use config::PollerConfig;
pub use error::{PollerError, RefreshError};
pub use handle::RefreshHandle;

use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::runtime::Handle;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::domain::{MachineConfig, MachineId, PricingDetails, Station, Zone};
use crate::facade::TicketMachineFacade;
use crate::store::{PricingStore, StationStore};

/// Result of a single refresh.
#[derive(Debug)]
pub enum RefreshOutcome {
    /// No machine id yet; nothing fetched
    Unprovisioned,

    /// New configuration fetched and applied
    Applied { stations: usize, fares: usize },

    /// Fetch or storage failed; previous configuration kept
    Failed(RefreshError),

    /// Poller was shut down; nothing fetched
    ShutDown,
}

enum Lifecycle {
    Created,
    Armed(JoinHandle<()>),
    ShutDown,
}

/// Everything readers can see. Only ever touched through `Shared::state`.
#[derive(Debug, Default)]
struct PollerState {
    machine_id: Option<MachineId>,
    last_attempt: Option<DateTime<Utc>>,
    last_success: Option<DateTime<Utc>>,
    snapshot: Option<Arc<MachineConfig>>,
}

struct Shared<F> {
    facade: Arc<F>,
    stations: Arc<dyn StationStore>,
    pricing: Arc<dyn PricingStore>,
    state: RwLock<PollerState>,
    /// Held for the whole of a refresh, fetch included.
    refresh_gate: Mutex<()>,
    lifecycle: Mutex<Lifecycle>,
}

/// Periodically fetches this machine's configuration from the facade.
pub struct ConfigPoller<F: TicketMachineFacade> {
    shared: Arc<Shared<F>>,
    runtime: Handle,
}

impl<F: TicketMachineFacade> Clone for ConfigPoller<F> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
            runtime: self.runtime.clone(),
        }
    }
}

impl<F: TicketMachineFacade> ConfigPoller<F> {
    /// Create a poller bound to `facade`, writing into the given stores.
    ///
    /// Subscribes to the facade's "configuration changed" notifications
    /// straight away. Must be called from inside a Tokio runtime, which is
    /// where notification-triggered refreshes will run.
    pub fn new(
        facade: Arc<F>,
        stations: Arc<dyn StationStore>,
        pricing: Arc<dyn PricingStore>,
    ) -> Result<Self, PollerError> {
        let runtime = Handle::try_current().map_err(|_| PollerError::NoRuntime)?;

        let poller = Self {
            shared: Arc::new(Shared {
                facade,
                stations,
                pricing,
                state: RwLock::new(PollerState::default()),
                refresh_gate: Mutex::new(()),
                lifecycle: Mutex::new(Lifecycle::Created),
            }),
            runtime,
        };

        poller
            .shared
            .facade
            .subscribe_config_changed(poller.refresh_handle());

        Ok(poller)
    }

    /// A handle that triggers a background refresh when called.
    pub fn refresh_handle(&self) -> RefreshHandle {
        let shared = Arc::downgrade(&self.shared);
        let runtime = self.runtime.clone();
        RefreshHandle::new(move || {
            let Some(shared) = shared.upgrade() else {
                return;
            };
            runtime.spawn(async move {
                shared.refresh().await;
            });
        })
    }

    /// Start the poll schedule: first refresh after `initial_delay`, then
    /// every `period`.
    ///
    /// Returns `Ok(true)` if this call armed the schedule and `Ok(false)` if
    /// it was already armed, in which case nothing changes.
    pub async fn init(&self, initial_delay: Duration, period: Duration) -> Result<bool, PollerError> {
        if period.is_zero() {
            return Err(PollerError::ZeroPeriod);
        }

        let mut lifecycle = self.shared.lifecycle.lock().await;
        match &*lifecycle {
            Lifecycle::Armed(_) => {
                debug!("init called when configuration poller already initialised");
                return Ok(false);
            }
            Lifecycle::ShutDown => return Err(PollerError::ShutDown),
            Lifecycle::Created => {}
        }

        let schedule = run_schedule(Arc::downgrade(&self.shared), initial_delay, period);
        *lifecycle = Lifecycle::Armed(self.runtime.spawn(schedule));
        info!(?initial_delay, ?period, "configuration poller armed");
        Ok(true)
    }

    /// [`init`](Self::init) using a [`PollerConfig`].
    pub async fn init_with(&self, config: &PollerConfig) -> Result<bool, PollerError> {
        self.init(config.initial_delay(), config.period()).await
    }

    /// Stop the schedule for good.
    ///
    /// Cancels any pending wait immediately. A refresh already running is
    /// left to finish on its own; later refresh requests are ignored.
    pub async fn shutdown(&self) {
        let mut lifecycle = self.shared.lifecycle.lock().await;
        if let Lifecycle::Armed(schedule) = std::mem::replace(&mut *lifecycle, Lifecycle::ShutDown) {
            schedule.abort();
        }
        info!("configuration poller shut down");
    }

    /// Fetch and apply configuration now, waiting for any refresh already
    /// in progress to finish first.
    pub async fn refresh(&self) -> RefreshOutcome {
        self.shared.refresh().await
    }

    pub async fn is_armed(&self) -> bool {
        matches!(*self.shared.lifecycle.lock().await, Lifecycle::Armed(_))
    }

    pub async fn is_shut_down(&self) -> bool {
        matches!(*self.shared.lifecycle.lock().await, Lifecycle::ShutDown)
    }

    pub async fn machine_id(&self) -> Option<MachineId> {
        self.shared.state.read().await.machine_id.clone()
    }

    /// Set the id this machine was provisioned with.
    pub async fn set_machine_id(&self, machine_id: MachineId) {
        info!(%machine_id, "machine id set");
        self.shared.state.write().await.machine_id = Some(machine_id);
    }

    /// Forget the machine id; refreshes become no-ops again.
    pub async fn clear_machine_id(&self) {
        self.shared.state.write().await.machine_id = None;
    }

    /// When the last refresh started, successful or not.
    pub async fn last_attempt(&self) -> Option<DateTime<Utc>> {
        self.shared.state.read().await.last_attempt
    }

    /// Start time of the last refresh that applied a configuration.
    pub async fn last_success(&self) -> Option<DateTime<Utc>> {
        self.shared.state.read().await.last_success
    }

    /// The most recently applied configuration.
    pub async fn snapshot(&self) -> Option<Arc<MachineConfig>> {
        self.shared.state.read().await.snapshot.clone()
    }

    pub async fn station_name(&self) -> Option<String> {
        self.snapshot().await.map(|c| c.station_name().to_string())
    }

    pub async fn station_zone(&self) -> Option<Zone> {
        self.snapshot().await.map(|c| c.station_zone())
    }

    /// Station list from the most recent snapshot; empty before the first.
    pub async fn station_list(&self) -> Vec<Station> {
        self.snapshot()
            .await
            .map(|c| c.station_list().to_vec())
            .unwrap_or_default()
    }

    pub async fn pricing_details(&self) -> Option<PricingDetails> {
        self.snapshot().await.map(|c| c.pricing_details().clone())
    }
}

impl<F: TicketMachineFacade> Shared<F> {
    async fn refresh(&self) -> RefreshOutcome {
        if matches!(*self.lifecycle.lock().await, Lifecycle::ShutDown) {
            debug!("refresh requested after shutdown, ignoring");
            return RefreshOutcome::ShutDown;
        }

        let _gate = self.refresh_gate.lock().await;

        let attempt = Utc::now();
        let machine_id = {
            let mut state = self.state.write().await;
            state.last_attempt = Some(attempt);
            state.machine_id.clone()
        };

        let Some(machine_id) = machine_id else {
            debug!(%attempt, "no machine id yet, skipping configuration fetch");
            return RefreshOutcome::Unprovisioned;
        };
        debug!(%attempt, %machine_id, "attempting to acquire configuration");

        match self.fetch_and_apply(&machine_id, attempt).await {
            Ok(config) => {
                let stations = config.station_list().len();
                let fares = config.pricing_details().len();
                info!(
                    %machine_id,
                    station = config.station_name(),
                    stations,
                    fares,
                    "acquired configuration"
                );
                RefreshOutcome::Applied { stations, fares }
            }
            Err(e) => {
                error!(%machine_id, error = %e, "problem when attempting to download configuration");
                RefreshOutcome::Failed(e)
            }
        }
    }

    /// Fetch, write both stores, then publish the snapshot.
    ///
    /// Caller must hold `refresh_gate`.
    async fn fetch_and_apply(
        &self,
        machine_id: &MachineId,
        attempt: DateTime<Utc>,
    ) -> Result<Arc<MachineConfig>, RefreshError> {
        let config = Arc::new(self.facade.fetch_config(machine_id).await?);

        // An unreadable store must not block the new snapshot from replacing it.
        let previous_stations = match self.stations.load() {
            Ok(stations) => Some(stations),
            Err(e) => {
                warn!(error = %e, "station storage unreadable, falling back to cached snapshot for rollback");
                self.state
                    .read()
                    .await
                    .snapshot
                    .as_ref()
                    .map(|c| c.station_list().to_vec())
            }
        };
        self.stations.replace_all(config.station_list())?;

        if let Err(e) = self.pricing.replace_all(config.pricing_details()) {
            if let Some(previous) = previous_stations
                && let Err(restore) = self.stations.replace_all(&previous)
            {
                warn!(error = %restore, "failed to restore station storage after pricing write failed");
            }
            return Err(e.into());
        }

        let mut state = self.state.write().await;
        state.snapshot = Some(config.clone());
        state.last_success = Some(attempt);

        Ok(config)
    }
}

/// Timer loop: refresh on every tick until aborted or the poller is dropped.
async fn run_schedule<F: TicketMachineFacade>(
    shared: Weak<Shared<F>>,
    initial_delay: Duration,
    period: Duration,
) {
    let mut ticks = tokio::time::interval_at(Instant::now() + initial_delay, period);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticks.tick().await;

        let Some(shared) = shared.upgrade() else {
            break;
        };

        // Separate task: aborting the schedule must not stop a refresh
        // between its two storage writes.
        let run = tokio::spawn(async move { shared.refresh().await });
        if let Err(e) = run.await {
            error!(error = %e, "scheduled refresh did not complete");
        }
    }
}
