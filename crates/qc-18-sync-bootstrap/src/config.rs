//! # Sync Bootstrap Configuration
//!
//! Configuration for host selection and genesis loading.
//!
//! Loaded from TOML, then overridden from `QC_SYNC_*` environment variables.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Port appended to peers configured without one.
pub const DEFAULT_PEER_PORT: u16 = 7078;

/// Per-step probe deadline.
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 1000;

/// What to do when block #1 is already stored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenesisPolicy {
    /// Leave the existing block and chain head untouched.
    #[default]
    SkipIfPresent,
    /// Rewrite block #1 and the chain head.
    Overwrite,
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("Cannot read config file {path}: {source}")]
    Read {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// TOML did not parse.
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("Invalid config value for {field}: {reason}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// What is wrong
        reason: String,
    },
}

/// Sync bootstrap configuration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SyncConfig {
    /// Candidate peers (`host:port` or bare `host`).
    pub peers: Vec<String>,

    /// Port appended to bare hosts.
    pub default_peer_port: u16,

    /// Deadline in milliseconds for each connect, write and read.
    pub probe_timeout_ms: u64,

    /// Export file to load block #1 from; embedded genesis when unset.
    pub first_block_path: Option<PathBuf>,

    /// Behaviour when block #1 already exists.
    pub genesis_policy: GenesisPolicy,

    /// Seconds between sync ticks.
    pub sync_interval_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            peers: Vec::new(),
            default_peer_port: DEFAULT_PEER_PORT,
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
            first_block_path: None,
            genesis_policy: GenesisPolicy::SkipIfPresent,
            sync_interval_secs: 60,
        }
    }
}

impl SyncConfig {
    /// Create a config for testing (short deadlines).
    pub fn for_testing() -> Self {
        Self {
            probe_timeout_ms: 200,
            sync_interval_secs: 1,
            ..Default::default()
        }
    }

    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: SyncConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Apply `QC_SYNC_*` overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup (env in production).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(peers) = lookup("QC_SYNC_PEERS") {
            self.peers = peers
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(ms) = lookup("QC_SYNC_PROBE_TIMEOUT_MS") {
            self.probe_timeout_ms = ms.parse().map_err(|_| ConfigError::Invalid {
                field: "probe_timeout_ms",
                reason: format!("not a number: {}", ms),
            })?;
        }
        if let Some(path) = lookup("QC_SYNC_FIRST_BLOCK") {
            self.first_block_path = Some(PathBuf::from(path));
        }
        if let Some(secs) = lookup("QC_SYNC_INTERVAL_SECS") {
            self.sync_interval_secs = secs.parse().map_err(|_| ConfigError::Invalid {
                field: "sync_interval_secs",
                reason: format!("not a number: {}", secs),
            })?;
        }
        self.validate()
    }

    /// Reject values that would stall or spin the daemon.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.probe_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "probe_timeout_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.sync_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "sync_interval_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.default_peer_port == 0 {
            return Err(ConfigError::Invalid {
                field: "default_peer_port",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Per-step probe deadline.
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    /// Delay between sync ticks.
    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs)
    }
}
