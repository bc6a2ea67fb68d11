//! campusdb HTTP/JSON gateway binary.

use std::sync::Arc;

use campusdb_core::{EntityStore, MemoryStore, Registrar, SledStore};
use campusdb_gateway::{create_router, AppState, Args, GatewayConfig};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Parse command line args
    let args = Args::parse();
    let config = GatewayConfig::from(&args);

    info!(
        listen = %config.listen_addr,
        ephemeral = config.ephemeral,
        "Starting campusdb gateway"
    );

    let store: Arc<dyn EntityStore> = if config.ephemeral {
        info!("Using ephemeral in-memory store; nothing will be persisted");
        Arc::new(MemoryStore::new())
    } else {
        info!(path = %config.data_dir.display(), "Opening sled store");
        Arc::new(SledStore::open(&config.data_dir)?)
    };

    // Create application state
    let state = AppState::new(Registrar::new(store), config.clone());

    // Create router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!("Gateway listening on {}", config.listen_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
