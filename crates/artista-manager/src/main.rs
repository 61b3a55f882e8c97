//! Artista Screen Manager
//!
//! Keeps a bank of Artista screens cycling through a pool of images.

mod config;
mod manager;

use anyhow::{Context, Result};
use artista_hw::{Controller, UsbBus};
use std::time::{Duration, Instant};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use config::Config;
use manager::Manager;

#[tokio::main]
async fn main() -> Result<()> {
    // Setup logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config/manager.toml".to_string());

    let config = Config::load(&config_path).context("Failed to load configuration")?;
    info!("Loaded configuration from: {}", config_path);
    info!(
        "Managing {} screen(s) with {} image(s)",
        config.screens.len(),
        config.images.len()
    );

    let bus = UsbBus::with_ids(config.usb.vid, config.usb.pid)?;
    let mut manager = Manager::new(Controller::new(bus), &config);
    manager.fill(Instant::now());
    info!(
        "{} screen(s) filled, {} image(s) waiting",
        manager.screens().iter().filter(|s| !s.offline).count(),
        manager.queue().len()
    );

    // Setup Unix signal handlers
    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
    let mut sigint = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())?;

    let tick = Duration::from_millis(config.tick);
    loop {
        if let Err(e) = manager.tick(Instant::now()) {
            error!("Stopping: {:#}", e);
            return Err(e);
        }

        tokio::select! {
            _ = tokio::time::sleep(tick) => {}
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down");
                break;
            }
            _ = sigint.recv() => {
                info!("Received SIGINT, shutting down");
                break;
            }
        }
    }

    Ok(())
}
