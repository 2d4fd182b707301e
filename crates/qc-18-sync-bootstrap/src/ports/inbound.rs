//! # Inbound Ports
//!
//! API traits the sync daemon calls into.

use async_trait::async_trait;
use std::path::Path;
use tokio_util::sync::CancellationToken;

use crate::domain::{BestHost, CommitOutcome, PeerAddress, SyncError};

/// Best-peer selection - inbound port.
#[async_trait]
pub trait HostSelectionApi: Send + Sync {
    /// Probe every host and return the one with the highest head.
    ///
    /// Waits for all probes; ties go to the host listed first.
    async fn choose_best_host(
        &self,
        cancel: &CancellationToken,
        hosts: &[PeerAddress],
    ) -> Result<BestHost, SyncError>;
}

/// Genesis loading - inbound port.
#[async_trait]
pub trait GenesisApi: Send + Sync {
    /// Commit the embedded genesis block.
    fn load_default_first_block(&self) -> Result<CommitOutcome, SyncError>;

    /// Decode an export file and commit the block it carries.
    async fn load_first_block_from_file(
        &self,
        cancel: &CancellationToken,
        path: &Path,
    ) -> Result<CommitOutcome, SyncError>;
}
