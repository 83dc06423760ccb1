use std::process;

use clap::Parser;
use healthportal::cli::Cli;
use healthportal::config::AppConfig;

#[tokio::main]
async fn main() {
    // Optional; a missing .env is ignored
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(2);
        }
    };

    healthportal::init_tracing(&config.log_filter);

    if let Err(e) = healthportal::run(config, shutdown_signal()).await {
        tracing::error!(error = %e, "Server failed");
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn load_config(cli: &Cli) -> Result<AppConfig, healthportal::config::ConfigError> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_overrides(cli.overrides())?;
    Ok(config)
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received SIGINT (Ctrl+C), shutting down");
            }
            _ = sigterm.recv() => {
                tracing::info!("Received SIGTERM, shutting down");
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        } else {
            tracing::info!("Received SIGINT (Ctrl+C), shutting down");
        }
    }
}
