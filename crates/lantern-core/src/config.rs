//! Configuration system for Lantern.
//!
//! Resolution order: environment variables → config file → defaults.
//!
//! Config file location:
//!   1. $LANTERN_CONFIG (explicit override)
//!   2. $XDG_CONFIG_HOME/lantern/config.toml
//!   3. ~/.config/lantern/config.toml

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::wire;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LanternConfig {
    pub network: NetworkConfig,
    pub timing: TimingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// UDP port the listener binds.
    pub listen_port: u16,
    /// UDP port announcements are sent to. Normally equals listen_port.
    pub announce_port: u16,
    /// Destination address for announcements.
    pub broadcast_addr: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Milliseconds between announce ticks.
    pub announce_interval_ms: u64,
    /// Milliseconds between presenter refreshes.
    pub refresh_interval_ms: u64,
    /// Staleness window — neighbours unheard for longer are not displayed.
    pub stale_after_ms: u64,
    /// Sweep threshold — table entries older than this are deleted.
    pub sweep_after_ms: u64,
}

// ── Defaults ──────────────────────────────────────────────────────────────────

impl Default for LanternConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            timing: TimingConfig::default(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            listen_port: wire::DISCOVERY_PORT,
            announce_port: wire::DISCOVERY_PORT,
            broadcast_addr: wire::BROADCAST_ADDR.to_string(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            announce_interval_ms: wire::ANNOUNCE_INTERVAL_MS,
            refresh_interval_ms: wire::REFRESH_INTERVAL_MS,
            stale_after_ms: wire::STALE_AFTER_MS,
            sweep_after_ms: wire::SWEEP_AFTER_MS,
        }
    }
}

// ── Path helpers ──────────────────────────────────────────────────────────────

fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_or_home().join(".config"))
        .join("lantern")
}

fn dirs_or_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
    #[error("failed to write {0}: {1}")]
    WriteFailed(PathBuf, std::io::Error),
    #[error("failed to serialize: {0}")]
    SerializeFailed(toml::ser::Error),
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl LanternConfig {
    /// Load config: env vars → file → defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(&Self::file_path())?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Read config from an explicit path, defaults if the file is absent.
    /// No env overrides — `load` applies those on top.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let text = std::fs::read_to_string(path)
                .map_err(|e| ConfigError::ReadFailed(path.to_path_buf(), e))?;
            toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(path.to_path_buf(), e))
        } else {
            Ok(LanternConfig::default())
        }
    }

    /// Config file path.
    pub fn file_path() -> PathBuf {
        std::env::var("LANTERN_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir().join("config.toml"))
    }

    /// Write default config if none exists. Returns the path.
    pub fn write_default_if_missing() -> Result<PathBuf, ConfigError> {
        let path = Self::file_path();
        Self::write_default_to(&path)?;
        Ok(path)
    }

    /// Write a default config at an explicit path unless one already exists.
    pub fn write_default_to(path: &Path) -> Result<(), ConfigError> {
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ConfigError::WriteFailed(path.to_path_buf(), e))?;
            }
            let text = toml::to_string_pretty(&LanternConfig::default())
                .map_err(ConfigError::SerializeFailed)?;
            std::fs::write(path, text)
                .map_err(|e| ConfigError::WriteFailed(path.to_path_buf(), e))?;
        }
        Ok(())
    }

    /// Apply LANTERN_* env var overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("LANTERN_NETWORK__LISTEN_PORT") {
            if let Ok(p) = v.parse() {
                self.network.listen_port = p;
            }
        }
        if let Ok(v) = std::env::var("LANTERN_NETWORK__ANNOUNCE_PORT") {
            if let Ok(p) = v.parse() {
                self.network.announce_port = p;
            }
        }
        if let Ok(v) = std::env::var("LANTERN_NETWORK__BROADCAST_ADDR") {
            self.network.broadcast_addr = v;
        }
        if let Ok(v) = std::env::var("LANTERN_TIMING__ANNOUNCE_INTERVAL_MS") {
            if let Ok(ms) = v.parse() {
                self.timing.announce_interval_ms = ms;
            }
        }
        if let Ok(v) = std::env::var("LANTERN_TIMING__STALE_AFTER_MS") {
            if let Ok(ms) = v.parse() {
                self.timing.stale_after_ms = ms;
            }
        }
    }
}
