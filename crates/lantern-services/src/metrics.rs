//! Host metrics — the OS facts that go into each announce tick.
//!
//! The announcer reads these through a trait so tests can substitute fixed
//! values instead of whatever machine the tests happen to run on.

use std::sync::Mutex;

use sysinfo::{MemoryRefreshKind, RefreshKind, System};

/// Read-only view of the local host, sampled once per announce tick.
pub trait HostMetrics: Send + Sync {
    fn hostname(&self) -> String;
    fn platform(&self) -> String;
    fn free_memory_bytes(&self) -> u64;
}

/// Live metrics from the running system.
///
/// Holds one `System` handle for the process lifetime and refreshes only
/// its memory stats on each read.
#[derive(Debug)]
pub struct SystemMetrics {
    sys: Mutex<System>,
}

impl SystemMetrics {
    pub fn new() -> Self {
        Self {
            sys: Mutex::new(System::new_with_specifics(
                RefreshKind::nothing().with_memory(MemoryRefreshKind::everything()),
            )),
        }
    }
}

impl Default for SystemMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl HostMetrics for SystemMetrics {
    fn hostname(&self) -> String {
        System::host_name().unwrap_or_else(|| "unknown".to_string())
    }

    fn platform(&self) -> String {
        std::env::consts::OS.to_string()
    }

    fn free_memory_bytes(&self) -> u64 {
        let mut sys = self.sys.lock().unwrap_or_else(|e| e.into_inner());
        sys.refresh_memory();
        sys.free_memory()
    }
}
