//! Lantern wire format — the status record a node broadcasts.
//!
//! Records travel as JSON datagrams with camelCase field names. The format
//! is self-describing and stable: receivers must keep accepting records from
//! older nodes that still include an `ipAddress` field. That field is never
//! trusted — the authoritative peer address is always the transport-layer
//! source address of the datagram.

use serde::{Deserialize, Serialize};

// ── Constants ─────────────────────────────────────────────────────────────────

/// UDP port on which status records are sent and received.
pub const DISCOVERY_PORT: u16 = 42069;

/// IPv4 limited broadcast address — reaches every host on the local segment.
pub const BROADCAST_ADDR: &str = "255.255.255.255";

/// Default announce interval in milliseconds.
pub const ANNOUNCE_INTERVAL_MS: u64 = 1000;

/// Default staleness window in milliseconds.
/// A neighbour not heard from within this window is absent from snapshots.
pub const STALE_AFTER_MS: u64 = 5000;

/// Default presenter refresh interval in milliseconds.
pub const REFRESH_INTERVAL_MS: u64 = 100;

/// Default sweep threshold in milliseconds.
/// Entries older than this are deleted from the table entirely.
pub const SWEEP_AFTER_MS: u64 = 60_000;

// ── Device Record ─────────────────────────────────────────────────────────────

/// One node's self-description, broadcast on every announce tick.
///
/// All fields are read fresh from the OS at broadcast time. `platform` is a
/// free-form identifier ("linux", "macos", ...) and is not validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRecord {
    pub hostname: String,
    pub platform: String,
    pub free_memory_mb: u64,
}

/// Serialize a record for transmission.
pub fn encode(record: &DeviceRecord) -> Result<Vec<u8>, RecordError> {
    Ok(serde_json::to_vec(record)?)
}

/// Parse a received datagram into a record.
///
/// Fails with [`RecordError::Malformed`] when the bytes are not JSON or lack
/// a required field of the correct type. Unknown fields (`ipAddress`,
/// `lastUpdate` from older nodes) are ignored.
pub fn decode(bytes: &[u8]) -> Result<DeviceRecord, RecordError> {
    Ok(serde_json::from_slice(bytes)?)
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// Errors that can arise when interpreting wire-format data.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("malformed device record: {0}")]
    Malformed(#[from] serde_json::Error),
}

// ── Tests ─────────────────────────────────────────────────────────────────────
