//! lantern-services — shared neighbour state and the discovery loops.

pub mod discovery;
pub mod metrics;
pub mod table;

pub use metrics::{HostMetrics, SystemMetrics};
pub use table::{NeighbourEntry, NeighbourTable};
