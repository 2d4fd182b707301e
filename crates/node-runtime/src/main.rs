//! # Quantum-Chain Node Runtime
//!
//! Entry point for the block sync daemon.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use qc_18_sync_bootstrap::{BlockCollector, InMemoryChainStore};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use node_runtime::{load_config, SyncDaemon, CONFIG_PATH_ENV};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("===========================================");
    info!("  Quantum-Chain Sync Daemon v{}", qc_18_sync_bootstrap::VERSION);
    info!("===========================================");

    // Load configuration
    let config_path = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
    let config = load_config(config_path.as_deref()).context("Failed to load sync config")?;

    let store = Arc::new(InMemoryChainStore::new());
    let daemon = SyncDaemon::from_collector(BlockCollector::with_tcp(config, store));

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown signal received");
                trigger.cancel();
            }
            Err(e) => error!("Failed to listen for Ctrl+C: {}", e),
        }
    });

    daemon.run(&cancel).await.context("Sync daemon halted")?;

    info!("Shutdown complete");
    Ok(())
}
