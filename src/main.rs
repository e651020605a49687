use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;

use midi_analyzer::ServerConfig;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::parse();

    let listener = TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr()))?;

    log::info!(
        "MIDI analyzer listening on http://{} (max upload {} bytes)",
        listener.local_addr()?,
        config.max_upload_bytes
    );

    midi_analyzer::serve(listener, &config, shutdown_signal())
        .await
        .context("Server error")?;

    log::info!("MIDI analyzer stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown signal received");
}
