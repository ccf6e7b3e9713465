//! Status announcement listener.
//!
//! Receives DeviceRecord datagrams on the discovery port and upserts them
//! into the neighbour table, keyed by the datagram's source address. A
//! separate sweep task deletes entries that have been stale for far longer
//! than the display window.

use std::net::{Ipv4Addr, SocketAddrV4};
use std::time::Duration;

use anyhow::{Context, Result};
use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;

use lantern_core::wire;

use crate::table::NeighbourTable;

/// Bind the discovery listener socket.
///
/// Bind failure (port taken, permission denied) is fatal to the daemon —
/// callers propagate it, they do not retry.
pub fn bind_listener_socket(port: u16) -> Result<std::net::UdpSocket> {
    let socket =
        Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP)).context("socket()")?;

    socket.set_reuse_address(true).context("SO_REUSEADDR")?;
    socket.set_nonblocking(true).context("set_nonblocking")?;

    let bind_addr = SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port);
    socket
        .bind(&bind_addr.into())
        .with_context(|| format!("failed to bind discovery port {port}"))?;

    Ok(socket.into())
}

/// Listen for status records and populate the neighbour table.
///
/// Runs forever — cancel by dropping the task handle. No per-datagram
/// failure escapes this loop: malformed records are dropped, receive errors
/// are logged and the loop continues.
pub async fn listener_loop(socket: std::net::UdpSocket, table: NeighbourTable) -> Result<()> {
    let socket = UdpSocket::from_std(socket).context("failed to convert to tokio UdpSocket")?;

    let mut buf = vec![0u8; 2048];

    tracing::info!(addr = %socket.local_addr()?, "discovery listener starting");

    loop {
        let (len, peer_addr) = match socket.recv_from(&mut buf).await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "recv_from failed");
                continue;
            }
        };

        match wire::decode(&buf[..len]) {
            Ok(record) => {
                tracing::debug!(
                    addr = %peer_addr,
                    hostname = %record.hostname,
                    "neighbour heard"
                );
                // The payload never decides the address — only the
                // transport-layer source does.
                table.upsert(peer_addr.ip(), record);
            }
            Err(e) => {
                tracing::debug!(addr = %peer_addr, error = %e, "dropping malformed datagram");
            }
        }
    }
}

/// Delete table entries that have not been refreshed within `older_than`,
/// checking every `every`. The daemon ticks this at the staleness window —
/// dead entries are already invisible to `snapshot` long before they are
/// deleted.
///
/// Runs forever — cancel by dropping the task handle.
pub async fn sweep_loop(table: NeighbourTable, every: Duration, older_than: Duration) {
    let mut interval = tokio::time::interval(every);

    loop {
        interval.tick().await;

        let removed = table.sweep(older_than);
        if removed > 0 {
            tracing::debug!(removed, "swept dead neighbour entries");
        }
    }
}
