//! lantern-core — wire format and configuration shared by all Lantern crates.

pub mod config;
pub mod wire;

pub use wire::{decode, encode, DeviceRecord, RecordError};
