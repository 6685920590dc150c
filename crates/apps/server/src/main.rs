mod config;
mod routes;

use std::sync::Arc;

use airports::AirportDirectory;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;
use crate::routes::{router, AppState};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = run().await {
        error!("{e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let config = ServerConfig::from_env()?;
    let directory = load_directory(&config).await?;
    info!(airports = directory.len(), "airport directory loaded");

    let app = router(AppState {
        directory: Arc::new(directory),
    });

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .map_err(|e| format!("bind {}: {e}", config.addr))?;
    info!("airport server listening on http://{}", config.addr);
    axum::serve(listener, app)
        .await
        .map_err(|e| format!("serve: {e}"))
}

async fn load_directory(config: &ServerConfig) -> Result<AirportDirectory, String> {
    let Some(path) = &config.airports_path else {
        return Ok(AirportDirectory::builtin());
    };
    let json = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| format!("read {path:?}: {e}"))?;
    AirportDirectory::from_json(&json).map_err(|e| format!("load {path:?}: {e}"))
}
