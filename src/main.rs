use std::sync::Arc;

use receipt_split::api::{AppState, create_router};
use receipt_split::config::ConfigLoader;
use receipt_split::store::InMemoryStore;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const CONFIG_ENV: &str = "RECEIPT_SPLIT_CONFIG";
const DEFAULT_CONFIG_DIR: &str = "./config/default";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_DIR.to_string());
    let loader = ConfigLoader::load(&config_dir)?;

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&loader.config().logging().level))?;
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let address = loader.config().server().bind_address();
    info!(config_dir = %config_dir, "Configuration loaded");

    let state = AppState::new(loader, Arc::new(InMemoryStore::new()));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!(address = %address, "Receipt split service listening");
    axum::serve(listener, app).await?;
    Ok(())
}
