use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use lane_distance::batch::{BatchConfig, BatchProcessor};
use lane_distance::config::AppConfig;
use lane_distance::geocache::{FileStore, GeocodeStore};
use lane_distance::geocoder::{MapboxClient, MapboxConfig, RateLimiter};
use lane_distance::locodes::LocodeTable;
use lane_distance::resolver::{Resolver, RetryConfig};
use lane_distance::web::{AppState, create_router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("lane_distance=info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = AppConfig::from_env()?;

    // Bundled seed codes, overridden by the full UN/LOCODE export if given
    let mut table = LocodeTable::bundled()?;
    if let Some(path) = &config.locode_table_path {
        let external = LocodeTable::load(path)?;
        info!(path = %path.display(), codes = external.len(), "Loaded UN/LOCODE table");
        table = table.merged(external);
    }
    info!(codes = table.len(), "Location code table ready");

    let store = Arc::new(FileStore::open(config.cache_path.clone()).await?);
    info!(
        path = %config.cache_path.display(),
        entries = store.len().await,
        "Geocode cache opened"
    );

    if config.mapbox_token.is_none() {
        warn!("MAPBOX_TOKEN not set; places without a known location code will fail");
    }
    let limiter = Arc::new(RateLimiter::new(config.geocode_min_interval));
    let geocoder = MapboxClient::new(MapboxConfig::new(config.mapbox_token.clone()), limiter)?;

    let resolver = Resolver::new(Arc::new(table), Arc::clone(&store), Arc::new(geocoder))
        .with_retry(RetryConfig::new(config.geocode_max_retries));
    let processor = BatchProcessor::new(Arc::new(resolver), BatchConfig::new(config.batch_size));

    let app = create_router(AppState::new(processor));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "Lane distance service listening");
    info!("  GET  /health    - Health check");
    info!("  POST /lanes     - Enrich a batch of lanes");
    info!("  GET  /resolve   - Resolve one place");
    info!("  GET  /distance  - Distance between two location codes");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.flush().await?;
    info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
