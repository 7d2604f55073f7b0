//! Typed TOML configuration for the coordination layer.
//!
//! The config struct is intentionally small and typed; every field has a
//! default so a partial (or absent) file still yields a runnable node.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Default capacity of the in-consensus / accepted / unknown substores.
pub const DEFAULT_SUBSTORE_CAPACITY: usize = 240;

/// Errors raised while loading configuration from disk.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Processing knobs for snapshot coordination.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProcessingConfig {
    /// How many recent snapshots the node keeps and advertises.
    pub recent_snapshot_number: usize,

    /// How many heights the node may trail the majority before falling
    /// behind alone warrants a redownload.
    pub snapshot_height_redownload_delay_interval: i64,

    /// Percentage (0–100) of `SnapshotInvalid` verification replies at
    /// which a broadcast triggers a cluster consistency check.
    pub max_invalid_snapshot_rate: u8,

    /// Capacity of each bounded lifecycle substore.
    pub substore_capacity: usize,

    /// Per-peer request timeout for snapshot RPCs, in seconds.
    pub peer_timeout_secs: u64,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            recent_snapshot_number: 30,
            snapshot_height_redownload_delay_interval: 30,
            max_invalid_snapshot_rate: 50,
            substore_capacity: DEFAULT_SUBSTORE_CAPACITY,
            peer_timeout_secs: 5,
        }
    }
}

/// Load a [`ProcessingConfig`] from a TOML file path.
/// If the file is missing or fails to parse, an error is returned.
pub fn load_from_file(path: impl AsRef<Path>) -> Result<ProcessingConfig, ConfigError> {
    let raw = fs::read_to_string(path.as_ref())?;
    let config = toml::from_str(&raw)?;
    Ok(config)
}
