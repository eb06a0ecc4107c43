use climate_hub::collector::Collector;
use climate_hub::config::{load_dotenv, Config};
use climate_hub::source::HaClient;
use climate_hub::storage::MemoryStore;
use log::info;
use std::sync::Arc;
use tokio::signal;

fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

#[tokio::main]
async fn main() {
    load_dotenv();
    init_logger();
    info!("Starting Climate Hub");

    // Load configuration
    let config = Config::from_env();
    info!("Configuration loaded:");
    info!("  Source URL: {}", config.source.base_url);
    info!(
        "  Collection interval: {} ms",
        config.schedule.collection_interval_ms
    );
    info!(
        "  Rediscovery interval: {} ms",
        config.schedule.rediscovery_interval_ms
    );
    info!(
        "  Cleanup interval: {} ms",
        config.schedule.cleanup_interval_ms
    );
    info!("  Retention: {} days", config.schedule.retention_days);

    let source = match HaClient::new(&config.source) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            log::error!("Failed to create telemetry client: {}", e);
            std::process::exit(1);
        }
    };
    let store = Arc::new(MemoryStore::new());

    let collector = Collector::new(source, store, config.schedule);
    if let Err(e) = collector.start().await {
        log::error!("Failed to start collector: {}", e);
        std::process::exit(1);
    }

    info!("Climate Hub is running");
    info!("  - Press Ctrl+C to exit");

    // Wait for shutdown signal
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Received shutdown signal");
        }
        Err(e) => {
            log::error!("Failed to listen for shutdown signal: {}", e);
        }
    }

    collector.stop().await;
    info!("Climate Hub stopped");
}
