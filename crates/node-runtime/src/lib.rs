//! # Quantum-Chain Node Runtime
//!
//! Drives the sync subsystem (qc-18) as a long-running daemon.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (TOML file named by `QC_SYNC_CONFIG`, then env)
//! 2. Bootstrap block #1 if the chain is empty
//! 3. Probe peers every `sync_interval_secs` until Ctrl+C
//!
//! Fatal bootstrap errors stop the daemon. Transient probe errors are
//! logged and retried on the next tick.

#![warn(missing_docs)]

use std::path::Path;
use std::sync::Arc;

use qc_18_sync_bootstrap::{
    BlockCollector, ChainStore, ConfigError, HeadProbe, SyncConfig, SyncError, SyncStatus,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Environment variable naming the TOML config file.
pub const CONFIG_PATH_ENV: &str = "QC_SYNC_CONFIG";

/// Load configuration from an optional file, then apply env overrides.
pub fn load_config(path: Option<&Path>) -> Result<SyncConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            info!("Loading sync config from {}", path.display());
            SyncConfig::from_file(path)?
        }
        None => SyncConfig::default(),
    };
    config.apply_env_overrides()?;
    Ok(config)
}

/// Periodic sync loop around a [`BlockCollector`].
pub struct SyncDaemon<S: ChainStore, P: HeadProbe> {
    collector: BlockCollector<S, P>,
}

impl<S: ChainStore + 'static, P: HeadProbe + 'static> SyncDaemon<S, P> {
    /// Create a daemon over explicit store and probe.
    pub fn new(config: SyncConfig, store: Arc<S>, probe: Arc<P>) -> Self {
        Self {
            collector: BlockCollector::new(config, store, probe),
        }
    }

    /// Wrap an existing collector.
    pub fn from_collector(collector: BlockCollector<S, P>) -> Self {
        Self { collector }
    }

    /// Tick until cancelled or a fatal error occurs.
    pub async fn run(&self, cancel: &CancellationToken) -> Result<(), SyncError> {
        let interval = self.collector.config().sync_interval();
        info!(
            "Sync daemon started: {} peer(s), interval {:?}",
            self.collector.config().peers.len(),
            interval
        );

        loop {
            match self.collector.tick(cancel).await {
                Ok(SyncStatus::Behind {
                    host,
                    local,
                    remote,
                }) => {
                    info!(
                        "Sync source {}: {} block(s) behind",
                        host,
                        remote.saturating_sub(local)
                    );
                }
                Ok(SyncStatus::UpToDate { local }) => {
                    info!("Chain up to date at block {}", local);
                }
                Err(SyncError::Cancelled) => break,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!("Sync tick failed: {}", e);
                    for failure in e.probe_failures() {
                        warn!("  {}: {}", failure.address, failure.error);
                    }
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }
        }

        info!("Sync daemon stopped");
        Ok(())
    }
}
