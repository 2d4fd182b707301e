//! # Block Collector
//!
//! One tick of the sync daemon: make sure the local chain has a genesis
//! block, find the furthest-ahead peer and report whether we are behind.
//! Fetching the missing blocks is left to the caller.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::adapters::TcpHeadProbe;
use crate::application::{GenesisBootstrapper, HostSelector};
use crate::config::SyncConfig;
use crate::domain::{BootstrapStage, SyncError, SyncStatus};
use crate::ports::{ChainStore, GenesisApi, HeadProbe, HostSelectionApi};

/// Periodic sync driver.
pub struct BlockCollector<S: ChainStore, P: HeadProbe> {
    config: SyncConfig,
    store: Arc<S>,
    bootstrapper: GenesisBootstrapper<S>,
    selector: HostSelector<P>,
}

impl<S: ChainStore + 'static, P: HeadProbe + 'static> BlockCollector<S, P> {
    /// Create a collector over explicit store and probe.
    pub fn new(config: SyncConfig, store: Arc<S>, probe: Arc<P>) -> Self {
        let bootstrapper = GenesisBootstrapper::new(Arc::clone(&store), config.genesis_policy);
        let selector = HostSelector::new(probe, config.default_peer_port);
        Self {
            config,
            store,
            bootstrapper,
            selector,
        }
    }

    /// Configuration in use.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Commit block #1 if the chain has no head yet.
    ///
    /// Returns the local head block id afterwards.
    pub async fn ensure_genesis(&self, cancel: &CancellationToken) -> Result<u64, SyncError> {
        let head = self
            .store
            .get_chain_head()
            .map_err(|source| SyncError::Storage {
                stage: BootstrapStage::Start,
                source,
            })?;

        if let Some(head) = head {
            debug!("[qc-18] Local head at block {}", head.block_id);
            return Ok(head.block_id);
        }

        info!("[qc-18] Local chain is empty, bootstrapping genesis");
        match &self.config.first_block_path {
            Some(path) => {
                self.bootstrapper
                    .load_first_block_from_file(cancel, path)
                    .await?
            }
            None => self.bootstrapper.load_default_first_block()?,
        };

        let head = self
            .store
            .get_chain_head()
            .map_err(|source| SyncError::Storage {
                stage: BootstrapStage::Done,
                source,
            })?;

        // Block 1 was already stored but no head pointed at it
        head.map(|h| h.block_id)
            .ok_or_else(|| SyncError::InconsistentGenesisState {
                stage: BootstrapStage::Done,
                reason: "block 1 present without a chain head".to_string(),
            })
    }

    /// Run one sync tick.
    pub async fn tick(&self, cancel: &CancellationToken) -> Result<SyncStatus, SyncError> {
        let local = self.ensure_genesis(cancel).await?;
        let best = self
            .selector
            .choose_best_host(cancel, &self.config.peers)
            .await?;

        if best.head_block_id > local {
            info!(
                "[qc-18] Behind {}: local={}, remote={}",
                best.address, local, best.head_block_id
            );
            Ok(SyncStatus::Behind {
                host: best.address,
                local,
                remote: best.head_block_id,
            })
        } else {
            debug!("[qc-18] Up to date at block {}", local);
            Ok(SyncStatus::UpToDate { local })
        }
    }
}

impl<S: ChainStore + 'static> BlockCollector<S, TcpHeadProbe> {
    /// Collector probing peers over TCP.
    pub fn with_tcp(config: SyncConfig, store: Arc<S>) -> Self {
        let probe = Arc::new(TcpHeadProbe::new(config.probe_timeout()));
        Self::new(config, store, probe)
    }
}
