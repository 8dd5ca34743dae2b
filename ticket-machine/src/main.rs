use std::error::Error;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ticket_machine::facade::{MockFacade, RestFacade, TicketMachineFacade};
use ticket_machine::poller::ConfigPoller;
use ticket_machine::settings::Settings;
use ticket_machine::store::{
    FilePricingStore, FileStationStore, MemoryPricingStore, MemoryStationStore, PricingStore,
    StationStore,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::from_env()?;

    let (stations, pricing): (Arc<dyn StationStore>, Arc<dyn PricingStore>) =
        match (settings.stations_path(), settings.pricing_path()) {
            (Some(stations), Some(pricing)) => {
                info!(dir = ?settings.data_dir, "keeping configuration on disk");
                (
                    Arc::new(FileStationStore::new(stations)),
                    Arc::new(FilePricingStore::new(pricing)),
                )
            }
            _ => {
                warn!("TICKET_MACHINE_DATA_DIR not set, configuration kept in memory only");
                (
                    Arc::new(MemoryStationStore::new()),
                    Arc::new(MemoryPricingStore::new()),
                )
            }
        };

    match &settings.mock_config {
        Some(path) => {
            info!(?path, "serving configuration from mock file");
            let facade = MockFacade::from_file(path)?;
            run(facade, stations, pricing, &settings).await
        }
        None => {
            info!(url = %settings.facade.base_url, "using ticket machine service");
            if settings.facade.ticket_secret.is_empty() {
                warn!("TICKET_SECRET not set, ticket validation codes will be weak");
            }
            let facade = RestFacade::new(settings.facade.clone())?;
            run(facade, stations, pricing, &settings).await
        }
    }
}

/// Poll for configuration until interrupted.
async fn run<F: TicketMachineFacade>(
    facade: F,
    stations: Arc<dyn StationStore>,
    pricing: Arc<dyn PricingStore>,
    settings: &Settings,
) -> Result<(), Box<dyn Error>> {
    let poller = ConfigPoller::new(Arc::new(facade), stations.clone(), pricing)?;

    match &settings.machine_id {
        Some(id) => poller.set_machine_id(id.clone()).await,
        None => warn!("TICKET_MACHINE_UUID not set, configuration will not be fetched"),
    }

    // Last good configuration from a previous run, until the first refresh lands.
    match stations.load() {
        Ok(stored) if !stored.is_empty() => {
            info!(stations = stored.len(), "loaded stored station list");
        }
        Ok(_) => {}
        Err(e) => warn!(error = %e, "stored station list unreadable, waiting for first refresh"),
    }

    poller.init_with(&settings.poller).await?;

    tokio::signal::ctrl_c().await?;
    info!("interrupted");
    poller.shutdown().await;

    Ok(())
}
