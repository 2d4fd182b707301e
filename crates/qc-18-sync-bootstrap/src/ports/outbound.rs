//! # Outbound Ports
//!
//! Dependencies the host application provides: the ledger store and the
//! transport used to probe peers.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

use crate::domain::{Block, ChainHead, ProbeError, StoreError};

/// Ledger storage collaborator.
///
/// Every call is blocking and individually atomic. No multi-call
/// transactions are assumed.
pub trait ChainStore: Send + Sync {
    /// Is a block with this id stored?
    fn block_exists(&self, id: u64) -> Result<bool, StoreError>;

    /// Read a block by id.
    fn get_block(&self, id: u64) -> Result<Option<Block>, StoreError>;

    /// Store a block, replacing any block with the same id.
    fn put_block(&self, block: &Block) -> Result<(), StoreError>;

    /// Point the chain head at a stored block.
    fn set_chain_head(&self, head: ChainHead) -> Result<(), StoreError>;

    /// Current chain head, `None` on an empty chain.
    fn get_chain_head(&self) -> Result<Option<ChainHead>, StoreError>;
}

/// Transport used to ask one peer for its head block id.
#[async_trait]
pub trait HeadProbe: Send + Sync {
    /// Run one bounded request/response exchange with `address`.
    async fn probe(&self, address: &str) -> Result<u64, ProbeError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Scripted probe answering from a fixed table.
///
/// Unknown addresses fail with `ConnectionFailed`. Addresses listed in
/// `stalled` never answer, which lets tests exercise cancellation.
#[derive(Default)]
pub struct MockHeadProbe {
    /// Head reported per address.
    pub heads: HashMap<String, u64>,
    /// Addresses that hang forever.
    pub stalled: Vec<String>,
    /// Addresses probed, in call order.
    pub calls: Mutex<Vec<String>>,
}

impl MockHeadProbe {
    /// Probe answering `heads`.
    pub fn with_heads(heads: &[(&str, u64)]) -> Self {
        Self {
            heads: heads
                .iter()
                .map(|(addr, head)| (addr.to_string(), *head))
                .collect(),
            ..Default::default()
        }
    }

    /// Mark an address as never answering.
    pub fn stall(mut self, address: &str) -> Self {
        self.stalled.push(address.to_string());
        self
    }

    /// Number of probes issued so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl HeadProbe for MockHeadProbe {
    async fn probe(&self, address: &str) -> Result<u64, ProbeError> {
        self.calls.lock().push(address.to_string());

        if self.stalled.iter().any(|a| a == address) {
            std::future::pending::<()>().await;
        }

        self.heads
            .get(address)
            .copied()
            .ok_or_else(|| ProbeError::ConnectionFailed {
                address: address.to_string(),
                reason: "connection refused".to_string(),
            })
    }
}
