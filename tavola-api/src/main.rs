use std::net::SocketAddr;
use std::sync::Arc;

use tavola_api::{app, state::AppState};
use tavola_catalog::{AvailabilityCache, ResourceRegistry};
use tavola_store::{DayLocks, InMemoryReservationStore, MenuStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tavola_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = tavola_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Tavola API on port {}", config.server.port);

    // Static data: startup fails fast on invalid configuration
    let registry = ResourceRegistry::from_configs(config.resources.clone())
        .expect("Invalid resource configuration");
    tracing::info!("Loaded {} resources", registry.len());

    let menu = MenuStore::from_file(&config.menu.path).expect("Failed to load menu");

    // Reservation event broadcast (SSE)
    let (events_tx, _) = tokio::sync::broadcast::channel(100);

    let app_state = AppState {
        registry: Arc::new(registry),
        reservations: Arc::new(InMemoryReservationStore::new()),
        cache: Arc::new(AvailabilityCache::new()),
        menu: Arc::new(menu),
        locks: Arc::new(DayLocks::new()),
        events_tx,
        rules: config.booking.clone(),
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
