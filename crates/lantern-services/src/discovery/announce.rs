//! Status announcement broadcast.
//!
//! Periodically sends this node's DeviceRecord to the limited broadcast
//! address so every host on the segment can discover it.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use socket2::{Domain, Protocol, Socket, Type};
use tokio::time;

use lantern_core::wire::{self, DeviceRecord};

use crate::metrics::HostMetrics;

/// Broadcast a fresh status record on a regular interval.
///
/// Runs forever — cancel by dropping the task handle.
///
/// Metrics are sampled anew on every tick, so the announced free-memory
/// figure tracks the live system. A failed send is logged and skipped; the
/// next tick retries naturally.
pub async fn announce_loop(
    metrics: Arc<dyn HostMetrics>,
    dest: SocketAddr,
    period: Duration,
) -> Result<()> {
    let socket = make_broadcast_socket().context("failed to create broadcast socket")?;

    let mut interval = time::interval(period);

    tracing::info!(%dest, period_ms = period.as_millis() as u64, "announcer starting");

    loop {
        interval.tick().await;

        let record = DeviceRecord {
            hostname: metrics.hostname(),
            platform: metrics.platform(),
            free_memory_mb: metrics.free_memory_bytes() / (1024 * 1024),
        };

        let bytes = match wire::encode(&record) {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode status record");
                continue;
            }
        };

        match socket.send_to(&bytes, &dest.into()) {
            Ok(n) => tracing::trace!(bytes = n, "announce sent"),
            Err(e) => tracing::warn!(error = %e, "announce send failed"),
        }
    }
}

/// Create a UDP socket permitted to send to the broadcast address.
/// SO_BROADCAST is a one-time setup, not per-send.
fn make_broadcast_socket() -> Result<Socket> {
    let socket =
        Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP)).context("socket()")?;

    socket.set_reuse_address(true).context("SO_REUSEADDR")?;
    socket.set_broadcast(true).context("SO_BROADCAST")?;

    Ok(socket)
}
