//! Neighbour table — the local view of peers on this segment.
//!
//! The table is a concurrent map from peer address to last-known status,
//! written by the listener and read by the presenter. Presence is decided
//! at read time: `snapshot` filters by age, it never mutates. A separate
//! sweep task deletes long-dead entries so the map does not grow without
//! bound on long runtimes.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use lantern_core::wire::DeviceRecord;

/// Tracked state for one discovered neighbour.
#[derive(Debug, Clone)]
pub struct NeighbourEntry {
    /// The address the datagram actually came from (transport layer).
    /// Never taken from the payload — a peer cannot claim another's address.
    pub addr: IpAddr,

    /// Self-reported host name.
    pub hostname: String,

    /// Self-reported platform identifier.
    pub platform: String,

    /// Self-reported free memory in megabytes at announce time.
    pub free_memory_mb: u64,

    /// When the last datagram from this address was processed.
    pub last_seen: Instant,
}

/// The neighbour table — shared between listener, sweep, and presenter tasks.
///
/// One entry per source address; a new datagram fully replaces the previous
/// entry for that address (last-write-wins, no field merge). DashMap gives
/// lock-free reads — the presenter never blocks the listener.
#[derive(Debug, Clone, Default)]
pub struct NeighbourTable {
    inner: Arc<DashMap<IpAddr, NeighbourEntry>>,
}

impl NeighbourTable {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
        }
    }

    /// Insert or replace the entry for `addr` from a freshly decoded record,
    /// stamped with the current time.
    pub fn upsert(&self, addr: IpAddr, record: DeviceRecord) {
        self.inner.insert(
            addr,
            NeighbourEntry {
                addr,
                hostname: record.hostname,
                platform: record.platform,
                free_memory_mb: record.free_memory_mb,
                last_seen: Instant::now(),
            },
        );
    }

    /// Entries heard from within `max_age`, ordered by ascending address
    /// string so repeated calls render in a stable order.
    pub fn snapshot(&self, max_age: Duration) -> Vec<NeighbourEntry> {
        let mut entries: Vec<NeighbourEntry> = self
            .inner
            .iter()
            .filter(|e| e.last_seen.elapsed() <= max_age)
            .map(|e| e.value().clone())
            .collect();
        entries.sort_by(|a, b| a.addr.to_string().cmp(&b.addr.to_string()));
        entries
    }

    /// Delete entries not refreshed within `older_than`. Returns the number
    /// removed.
    pub fn sweep(&self, older_than: Duration) -> usize {
        let before = self.inner.len();
        self.inner.retain(|_, entry| entry.last_seen.elapsed() < older_than);
        // The listener may upsert concurrently, so the count is advisory.
        before.saturating_sub(self.inner.len())
    }

    /// Number of entries, including stale ones.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
