use cloakscope::adapters::inbound::WsConnector;
use cloakscope::adapters::outbound::{init_combined_logger, init_console_logger, LoggingObserver};
use cloakscope::application::{ConnectionSupervisor, FleetService, LocationCloakingService};
use cloakscope::common::{Reconciler, StreamConnector};
use cloakscope::domains::path_confusion::PathConfusionState;
use cloakscope::Config;
use std::error::Error;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting cloakscope");

    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.toml".to_string());
    let config = Config::load(Some(&config_path))?;
    info!("Configuration loaded from defaults, {} and environment", config_path);

    let logger = match &config.logging.file {
        Some(path) => init_combined_logger(path),
        None => init_console_logger(),
    };
    let connector: Arc<dyn StreamConnector> = Arc::new(WsConnector::new());

    let location = config.location_server.enabled.then(|| {
        info!("Observing location server at {}", config.location_server.endpoint());
        let service = LocationCloakingService::new(logger.clone(), config.tile_colors.clone())
            .with_observer(Arc::new(LoggingObserver));
        ConnectionSupervisor::spawn(
            config.supervisor.settings_for(&config.location_server),
            connector.clone(),
            service,
        )
    });

    let fleet = config.fleet.enabled.then(|| {
        info!("Observing fleet at {}", config.fleet.endpoint());
        ConnectionSupervisor::spawn(
            config.supervisor.settings_for(&config.fleet),
            connector.clone(),
            FleetService::new(logger.clone(), config.temporal_cloaking.clone()),
        )
    });

    let path_confusion = config.path_confusion.server.enabled.then(|| {
        info!("Observing path confusion server at {}", config.path_confusion.server.endpoint());
        ConnectionSupervisor::spawn(
            config.supervisor.settings_for(&config.path_confusion.server),
            connector.clone(),
            Reconciler::<PathConfusionState>::new(logger.clone()),
        )
    });

    tokio::signal::ctrl_c().await?;
    info!("Shutting down cloakscope");

    if let Some(handle) = location {
        match handle.shutdown().await {
            Ok(service) => info!(
                "location cloaking: {} agents, {} frames dropped",
                service.state().agents.len(),
                service.reconciler().dropped()
            ),
            Err(e) => error!("location cloaking supervisor: {}", e),
        }
    }
    if let Some(handle) = fleet {
        match handle.shutdown().await {
            Ok(service) => info!("fleet: {} vehicles", service.state().agents.len()),
            Err(e) => error!("fleet supervisor: {}", e),
        }
    }
    if let Some(handle) = path_confusion {
        match handle.shutdown().await {
            Ok(reconciler) => info!(
                "path confusion: {} release entries",
                reconciler.state().release_entries.len()
            ),
            Err(e) => error!("path confusion supervisor: {}", e),
        }
    }

    Ok(())
}
