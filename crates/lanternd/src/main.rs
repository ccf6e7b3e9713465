//! lanternd — Lantern LAN discovery daemon.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use lantern_core::config::LanternConfig;
use lantern_services::{discovery, HostMetrics, NeighbourTable, SystemMetrics};

mod presenter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load config
    if let Err(e) = LanternConfig::write_default_if_missing() {
        tracing::warn!(error = %e, "failed to write default config");
    }
    let config = LanternConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load config, using defaults");
        LanternConfig::default()
    });

    tracing::info!(
        listen_port = config.network.listen_port,
        announce_port = config.network.announce_port,
        "lanternd starting"
    );

    let dest: SocketAddr = format!(
        "{}:{}",
        config.network.broadcast_addr, config.network.announce_port
    )
    .parse()
    .context("invalid broadcast address in config")?;

    // Bind before spawning anything — a taken port is fatal at startup.
    let listen_socket = discovery::bind_listener_socket(config.network.listen_port)?;

    // Shared state
    let table = NeighbourTable::new();
    let metrics: Arc<dyn HostMetrics> = Arc::new(SystemMetrics::new());

    // ── Spawn tasks ──────────────────────────────────────────────────────────

    let announce_task = tokio::spawn(discovery::announce_loop(
        metrics,
        dest,
        Duration::from_millis(config.timing.announce_interval_ms),
    ));

    let listener_task = tokio::spawn(discovery::listener_loop(listen_socket, table.clone()));

    let sweep_task = tokio::spawn(discovery::sweep_loop(
        table.clone(),
        Duration::from_millis(config.timing.stale_after_ms),
        Duration::from_millis(config.timing.sweep_after_ms),
    ));

    let presenter_task = tokio::spawn(presenter::presenter_loop(
        table,
        Duration::from_millis(config.timing.refresh_interval_ms),
        Duration::from_millis(config.timing.stale_after_ms),
    ));

    // ── Wait for exit ────────────────────────────────────────────────────────

    tokio::select! {
        _ = tokio::signal::ctrl_c() => tracing::info!("shutdown signal received"),
        r = announce_task  => tracing::error!("announcer exited: {:?}", r),
        r = listener_task  => tracing::error!("listener exited: {:?}", r),
        r = sweep_task     => tracing::error!("sweep task exited: {:?}", r),
        r = presenter_task => tracing::error!("presenter exited: {:?}", r),
    }

    Ok(())
}
