mod bootstrap;
mod demo;
mod health;
mod processor;
mod webhook;

#[cfg(test)]
mod testing;

use anyhow::Result;
use mailduet_core::config::{AppConfig, LoadOptions};

fn init_logging(config: &AppConfig) {
    use mailduet_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // Load config and initialize logging before any other operations
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config).await?;

    let address = format!("{}:{}", app.config.server.bind_address, app.config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;

    let _ = &app.db_pool;

    tracing::info!(
        event_name = "system.server.started",
        bind_address = %address,
        webhook_mode = if app.config.demo.public_base_url.is_some() { "push" } else { "poll_only" },
        "mailduet-server started"
    );

    axum::serve(listener, app.router).with_graceful_shutdown(wait_for_shutdown()).await?;

    tracing::info!(event_name = "system.server.stopping", "mailduet-server stopping");

    Ok(())
}

async fn wait_for_shutdown() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(
            event_name = "system.server.shutdown_signal_error",
            error = %error,
            "failed to listen for shutdown signal"
        );
    }
}
