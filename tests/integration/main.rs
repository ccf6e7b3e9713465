//! Lantern integration test harness.
//!
//! Tests in this crate run the real discovery loops over loopback UDP.
//! Each test binds its own ephemeral port, so tests are independent and
//! can run in parallel. Timing-sensitive assertions poll with a generous
//! deadline instead of sleeping a fixed amount.

mod discovery;

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};

use lantern_services::discovery::{bind_listener_socket, listener_loop};
use lantern_services::{HostMetrics, NeighbourTable};

// ── Harness ───────────────────────────────────────────────────────────────────

/// Spawn a real listener loop on an ephemeral loopback port.
/// Returns the table it writes and the port to send datagrams to.
/// Must be called from within a tokio runtime.
pub fn start_listener() -> Result<(NeighbourTable, u16)> {
    let socket = bind_listener_socket(0).context("bind ephemeral listener port")?;
    let port = socket.local_addr().context("listener local_addr")?.port();
    let table = NeighbourTable::new();
    tokio::spawn(listener_loop(socket, table.clone()));
    Ok((table, port))
}

/// A sender socket on loopback, plus its address as the listener will see it.
pub fn sender_socket() -> Result<(std::net::UdpSocket, SocketAddr)> {
    let socket = std::net::UdpSocket::bind("127.0.0.1:0").context("bind sender socket")?;
    let addr = socket.local_addr().context("sender local_addr")?;
    Ok((socket, addr))
}

pub fn send_to_listener(socket: &std::net::UdpSocket, port: u16, payload: &[u8]) -> Result<()> {
    socket
        .send_to(payload, ("127.0.0.1", port))
        .with_context(|| format!("send datagram to listener port {port}"))?;
    Ok(())
}

/// Poll `cond` until it holds or `timeout` passes.
pub async fn wait_until<F: Fn() -> bool>(cond: F, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    cond()
}

// ── Fakes ─────────────────────────────────────────────────────────────────────

/// Fixed metrics so announcer tests do not depend on the host machine.
pub struct FakeMetrics {
    pub hostname: &'static str,
    pub platform: &'static str,
    pub free_bytes: u64,
}

impl HostMetrics for FakeMetrics {
    fn hostname(&self) -> String {
        self.hostname.to_string()
    }

    fn platform(&self) -> String {
        self.platform.to_string()
    }

    fn free_memory_bytes(&self) -> u64 {
        self.free_bytes
    }
}
