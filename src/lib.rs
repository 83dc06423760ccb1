pub mod api;
pub mod cli;
pub mod config;
pub mod core_state;
pub mod dashboard;
pub mod db;
pub mod doses;
pub mod models;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::core_state::CoreState;
use crate::db::{DatabaseError, Storage};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error("Failed to open storage: {0}")]
    Storage(#[from] DatabaseError),
    #[error("Invalid bind address '{0}'")]
    Address(String),
    #[error(transparent)]
    Server(#[from] api::ServerError),
}

/// Install the global fmt subscriber. `RUST_LOG` wins over `fallback`.
pub fn init_tracing(fallback: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .try_init();
}

/// Open storage, serve the API, and stop when `shutdown` resolves.
pub async fn run(
    config: AppConfig,
    shutdown: impl Future<Output = ()>,
) -> Result<(), StartupError> {
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .map_err(|_| StartupError::Address(config.bind_address()))?;

    let storage = Storage::open(&config.storage)?;
    tracing::info!(backend = storage.backend(), "Storage ready");

    let core = Arc::new(CoreState::new(storage));
    let server = api::start_api_server(core, addr).await?;
    tracing::info!(addr = %server.session.server_addr, "Listening");

    shutdown.await;
    server.stop().await;
    Ok(())
}
