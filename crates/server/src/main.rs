mod bootstrap;
mod health;
mod ollama;
mod transcribe;
mod ws;

use anyhow::Result;
use tracing::info;

use minutey_core::config::{AppConfig, LoadOptions};

fn init_logging(config: &AppConfig) {
    use minutey_core::config::LogFormat::*;
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
    // Load config and initialize logging before any other operations.
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config).await?;

    let http = reqwest::Client::new();
    health::spawn(
        &app.config.server.bind_address,
        app.config.server.health_check_port,
        http,
        app.config.llm.base_url.clone(),
    )
    .await?;

    let address = format!("{}:{}", app.config.server.bind_address, app.config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!(
        event_name = "server.started",
        bind_address = %address,
        "minutey-server listening for sessions"
    );

    axum::serve(listener, ws::router(app.engine.clone()))
        .with_graceful_shutdown(wait_for_shutdown())
        .await?;

    info!(event_name = "server.stopped", "minutey-server stopped");
    Ok(())
}

async fn wait_for_shutdown() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!(event_name = "server.stopping", "shutdown signal received");
    }
}
