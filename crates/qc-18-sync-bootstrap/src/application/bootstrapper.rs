//! # Genesis Bootstrapper
//!
//! Ensures block #1 and the chain head exist, sourced from the embedded
//! default or from an export file.
//!
//! ```text
//! Start -> ReadSource{Embedded|File} -> Decode -> CommitBlock -> CommitHead -> Done
//!            \__________________________ any failure ___________________/ -> Failed
//! ```
//!
//! The block is always written before the chain head, so the head never
//! points at a missing block. A head write failing after the block write
//! is escalated as `InconsistentGenesisState`.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::codec::{decode_genesis_envelope, encode_genesis_envelope};
use crate::config::GenesisPolicy;
use crate::domain::{
    default_genesis_block, Block, BootstrapStage, ChainHead, CodecError, CommitOutcome, SyncError,
    GENESIS_BLOCK_ID,
};
use crate::ports::{ChainStore, GenesisApi};

/// Loads and commits the first block.
///
/// Not meant to run concurrently with itself; call once at startup.
pub struct GenesisBootstrapper<S: ChainStore> {
    store: Arc<S>,
    policy: GenesisPolicy,
}

impl<S: ChainStore> GenesisBootstrapper<S> {
    /// Create a bootstrapper writing to `store`.
    pub fn new(store: Arc<S>, policy: GenesisPolicy) -> Self {
        Self { store, policy }
    }

    /// Existing-genesis policy in effect.
    pub fn policy(&self) -> GenesisPolicy {
        self.policy
    }

    /// Write `block` as block #1 and point the chain head at it.
    pub fn commit(&self, block: &Block) -> Result<CommitOutcome, SyncError> {
        if !block.is_genesis() {
            return Err(SyncError::MalformedEnvelope(CodecError::MalformedEnvelope(
                format!("expected block {}, found block {}", GENESIS_BLOCK_ID, block.id),
            )));
        }

        if self.policy == GenesisPolicy::SkipIfPresent {
            let present = self
                .store
                .block_exists(GENESIS_BLOCK_ID)
                .map_err(|source| SyncError::Storage {
                    stage: BootstrapStage::Start,
                    source,
                })?;
            if present {
                info!("[qc-18] Block 1 already stored, skipping genesis commit");
                return Ok(CommitOutcome::AlreadyPresent);
            }
        }

        debug!(
            "[qc-18] Committing genesis block hash={}",
            hex::encode(&block.hash[..8])
        );

        self.store
            .put_block(block)
            .map_err(|source| SyncError::Storage {
                stage: BootstrapStage::CommitBlock,
                source,
            })?;

        if let Err(e) = self.store.set_chain_head(ChainHead::for_block(block)) {
            error!("[qc-18] Block 1 stored but chain head update failed: {}", e);
            return Err(SyncError::InconsistentGenesisState {
                stage: BootstrapStage::CommitHead,
                reason: e.to_string(),
            });
        }

        info!(
            "[qc-18] Genesis committed: block={}, stage={}",
            block.id,
            BootstrapStage::Done
        );
        Ok(CommitOutcome::Committed)
    }
}

#[async_trait]
impl<S: ChainStore + 'static> GenesisApi for GenesisBootstrapper<S> {
    fn load_default_first_block(&self) -> Result<CommitOutcome, SyncError> {
        info!("[qc-18] Loading embedded genesis block");
        self.commit(&default_genesis_block())
    }

    async fn load_first_block_from_file(
        &self,
        cancel: &CancellationToken,
        path: &Path,
    ) -> Result<CommitOutcome, SyncError> {
        info!("[qc-18] Loading genesis block from {}", path.display());

        // Nothing is written until the whole file has decoded
        let block = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(SyncError::Cancelled),
            block = read_envelope(path) => block?,
        };

        self.commit(&block)
    }
}

async fn read_envelope(path: &Path) -> Result<Block, SyncError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| match source.kind() {
            ErrorKind::NotFound => SyncError::FileNotFound(path.to_path_buf()),
            _ => SyncError::GenesisRead {
                path: path.to_path_buf(),
                source,
            },
        })?;
    decode_genesis_envelope(&bytes).map_err(SyncError::MalformedEnvelope)
}

/// Write `block` to `path` as a genesis export envelope.
pub async fn export_first_block(path: &Path, block: &Block) -> Result<(), SyncError> {
    let bytes = encode_genesis_envelope(block).map_err(SyncError::MalformedEnvelope)?;
    tokio::fs::write(path, bytes).await?;
    info!("[qc-18] Exported block {} to {}", block.id, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryChainStore;
    use crate::domain::StoreError;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Store whose writes can be made to fail.
    #[derive(Default)]
    struct FlakyStore {
        inner: InMemoryChainStore,
        fail_put: AtomicBool,
        fail_head: AtomicBool,
    }

    impl ChainStore for FlakyStore {
        fn block_exists(&self, id: u64) -> Result<bool, StoreError> {
            self.inner.block_exists(id)
        }

        fn get_block(&self, id: u64) -> Result<Option<Block>, StoreError> {
            self.inner.get_block(id)
        }

        fn put_block(&self, block: &Block) -> Result<(), StoreError> {
            if self.fail_put.load(Ordering::SeqCst) {
                return Err(StoreError::Backend("disk full".to_string()));
            }
            self.inner.put_block(block)
        }

        fn set_chain_head(&self, head: ChainHead) -> Result<(), StoreError> {
            if self.fail_head.load(Ordering::SeqCst) {
                return Err(StoreError::Backend("write timeout".to_string()));
            }
            self.inner.set_chain_head(head)
        }

        fn get_chain_head(&self) -> Result<Option<ChainHead>, StoreError> {
            self.inner.get_chain_head()
        }
    }

    fn bootstrapper(
        policy: GenesisPolicy,
    ) -> (
        Arc<InMemoryChainStore>,
        GenesisBootstrapper<InMemoryChainStore>,
    ) {
        let store = Arc::new(InMemoryChainStore::new());
        (Arc::clone(&store), GenesisBootstrapper::new(store, policy))
    }

    #[test]
    fn test_load_default_on_empty_store() {
        let (store, boot) = bootstrapper(GenesisPolicy::SkipIfPresent);

        let outcome = boot.load_default_first_block().unwrap();

        assert_eq!(outcome, CommitOutcome::Committed);
        assert!(store.block_exists(1).unwrap());
        assert_eq!(store.get_chain_head().unwrap().unwrap().block_id, 1);
    }

    #[test]
    fn test_load_default_twice_is_noop() {
        let (store, boot) = bootstrapper(GenesisPolicy::SkipIfPresent);
        boot.load_default_first_block().unwrap();
        let head_before = store.get_chain_head().unwrap();

        let outcome = boot.load_default_first_block().unwrap();

        assert_eq!(outcome, CommitOutcome::AlreadyPresent);
        assert_eq!(store.get_chain_head().unwrap(), head_before);
        assert_eq!(store.block_count(), 1);
    }

    #[test]
    fn test_overwrite_policy_rewrites() {
        let (store, boot) = bootstrapper(GenesisPolicy::Overwrite);
        boot.load_default_first_block().unwrap();

        let replacement = Block::new(1, 42, 1, 7, 0, 1, vec![1], vec![2], "x:1".to_string());
        let outcome = boot.commit(&replacement).unwrap();

        assert_eq!(outcome, CommitOutcome::Committed);
        assert_eq!(store.get_block(1).unwrap(), Some(replacement.clone()));
        assert_eq!(store.get_chain_head().unwrap().unwrap().hash, replacement.hash);
    }

    #[test]
    fn test_non_genesis_block_rejected() {
        let (store, boot) = bootstrapper(GenesisPolicy::SkipIfPresent);
        let block = Block::new(2, 0, 1, 0, 0, 1, vec![], vec![], String::new());

        assert!(matches!(
            boot.commit(&block),
            Err(SyncError::MalformedEnvelope(_))
        ));
        assert_eq!(store.block_count(), 0);
    }

    #[test]
    fn test_head_failure_is_inconsistent_state() {
        let store = Arc::new(FlakyStore::default());
        store.fail_head.store(true, Ordering::SeqCst);
        let boot = GenesisBootstrapper::new(Arc::clone(&store), GenesisPolicy::SkipIfPresent);

        let result = boot.load_default_first_block();

        let err = result.unwrap_err();
        assert!(matches!(
            err,
            SyncError::InconsistentGenesisState {
                stage: BootstrapStage::CommitHead,
                ..
            }
        ));
        assert!(err.is_fatal());
        assert_eq!(store.get_chain_head().unwrap(), None);
    }

    #[test]
    fn test_block_failure_writes_nothing() {
        let store = Arc::new(FlakyStore::default());
        store.fail_put.store(true, Ordering::SeqCst);
        let boot = GenesisBootstrapper::new(Arc::clone(&store), GenesisPolicy::SkipIfPresent);

        let result = boot.load_default_first_block();

        assert!(matches!(
            result,
            Err(SyncError::Storage {
                stage: BootstrapStage::CommitBlock,
                ..
            })
        ));
        assert!(!store.block_exists(1).unwrap());
        assert_eq!(store.get_chain_head().unwrap(), None);
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let (store, boot) = bootstrapper(GenesisPolicy::SkipIfPresent);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("1block");
        let block = Block::new(
            1,
            1_600_000_000,
            1,
            99,
            0,
            1,
            vec![7; 64],
            vec![8; 64],
            "h:1".to_string(),
        );
        export_first_block(&path, &block).await.unwrap();

        let outcome = boot
            .load_first_block_from_file(&CancellationToken::new(), &path)
            .await
            .unwrap();

        assert_eq!(outcome, CommitOutcome::Committed);
        assert_eq!(store.get_block(1).unwrap(), Some(block.clone()));
        let head = store.get_chain_head().unwrap().unwrap();
        assert_eq!(head, ChainHead::for_block(&block));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let (store, boot) = bootstrapper(GenesisPolicy::SkipIfPresent);
        let dir = tempfile::tempdir().unwrap();

        let result = boot
            .load_first_block_from_file(&CancellationToken::new(), &dir.path().join("absent"))
            .await;

        assert!(matches!(result, Err(SyncError::FileNotFound(_))));
        assert_eq!(store.block_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_file_is_malformed() {
        let (store, boot) = bootstrapper(GenesisPolicy::SkipIfPresent);
        let file = tempfile::NamedTempFile::new().unwrap();

        let result = boot
            .load_first_block_from_file(&CancellationToken::new(), file.path())
            .await;

        assert!(matches!(result, Err(SyncError::MalformedEnvelope(_))));
        assert_eq!(store.block_count(), 0);
        assert_eq!(store.get_chain_head().unwrap(), None);
    }

    #[tokio::test]
    async fn test_truncated_file_is_malformed() {
        let (store, boot) = bootstrapper(GenesisPolicy::SkipIfPresent);
        let file = tempfile::NamedTempFile::new().unwrap();
        let bytes = encode_genesis_envelope(&default_genesis_block()).unwrap();
        std::fs::write(file.path(), &bytes[..bytes.len() / 2]).unwrap();

        let result = boot
            .load_first_block_from_file(&CancellationToken::new(), file.path())
            .await;

        assert!(matches!(result, Err(SyncError::MalformedEnvelope(_))));
        assert_eq!(store.block_count(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_before_read() {
        let (store, boot) = bootstrapper(GenesisPolicy::SkipIfPresent);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("1block");
        export_first_block(&path, &default_genesis_block()).await.unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = boot.load_first_block_from_file(&cancel, &path).await;

        assert!(matches!(result, Err(SyncError::Cancelled)));
        assert_eq!(store.block_count(), 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_cancelled_during_read() {
        let (store, boot) = bootstrapper(GenesisPolicy::SkipIfPresent);
        let dir = tempfile::tempdir().unwrap();
        // Opening a FIFO with no writer blocks, holding the read in flight
        let fifo = dir.path().join("1block");
        let status = std::process::Command::new("mkfifo")
            .arg(&fifo)
            .status()
            .unwrap();
        assert!(status.success());

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let result = tokio::time::timeout(
            std::time::Duration::from_secs(2),
            boot.load_first_block_from_file(&cancel, &fifo),
        )
        .await
        .expect("load must return once cancelled");

        assert!(matches!(result, Err(SyncError::Cancelled)));
        assert_eq!(store.block_count(), 0);
        assert_eq!(store.get_chain_head().unwrap(), None);

        // Release the blocked reader so the runtime can shut down
        let writer = std::fs::OpenOptions::new().write(true).open(&fifo).unwrap();
        drop(writer);
    }

    #[tokio::test]
    async fn test_unreadable_path_is_fatal() {
        let (store, boot) = bootstrapper(GenesisPolicy::SkipIfPresent);
        let dir = tempfile::tempdir().unwrap();

        let result = boot
            .load_first_block_from_file(&CancellationToken::new(), dir.path())
            .await;

        let err = result.unwrap_err();
        assert!(matches!(err, SyncError::GenesisRead { .. }));
        assert!(err.is_fatal());
        assert_eq!(store.block_count(), 0);
    }
}
