//! # Domain Entities
//!
//! Ledger entries touched by the bootstrap path and the per-peer probe
//! results produced by host selection.

use super::errors::ProbeError;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

/// Hash type alias (32-byte Keccak-256)
pub type Hash = [u8; 32];

/// Peer endpoint (`host:port`). Duplicates are allowed.
pub type PeerAddress = String;

/// Id of the first block of every chain.
pub const GENESIS_BLOCK_ID: u64 = 1;

/// Ledger block as far as bootstrap is concerned.
///
/// Only the identity of block #1 matters here; the body carries the
/// fields the first block needs to seed the network (key material and the
/// issuing node's host).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Block {
    /// Block id, starting at 1.
    pub id: u64,
    /// Creation time (Unix seconds).
    pub time: u64,
    /// Ecosystem the block belongs to.
    pub ecosystem_id: u64,
    /// Wallet id of the block signer.
    pub key_id: i64,
    /// Position of the issuing node in the validator list.
    pub node_position: u32,
    /// Block format version.
    pub version: u32,
    /// Public key of the first wallet.
    pub public_key: Vec<u8>,
    /// Public key of the issuing node.
    pub node_public_key: Vec<u8>,
    /// Address the issuing node listens on.
    pub host: String,
    /// Keccak-256 over every other field.
    pub hash: Hash,
}

impl Block {
    /// Create a block and seal it with its content hash.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: u64,
        time: u64,
        ecosystem_id: u64,
        key_id: i64,
        node_position: u32,
        version: u32,
        public_key: Vec<u8>,
        node_public_key: Vec<u8>,
        host: String,
    ) -> Self {
        let mut block = Self {
            id,
            time,
            ecosystem_id,
            key_id,
            node_position,
            version,
            public_key,
            node_public_key,
            host,
            hash: [0u8; 32],
        };
        block.hash = block.compute_hash();
        block
    }

    /// Hash all fields except `hash` deterministically.
    pub fn compute_hash(&self) -> Hash {
        let mut hasher = Keccak256::new();

        hasher.update(self.id.to_be_bytes());
        hasher.update(self.time.to_be_bytes());
        hasher.update(self.ecosystem_id.to_be_bytes());
        hasher.update(self.key_id.to_be_bytes());
        hasher.update(self.node_position.to_be_bytes());
        hasher.update(self.version.to_be_bytes());
        // Length prefixes keep adjacent variable fields unambiguous
        hasher.update((self.public_key.len() as u32).to_be_bytes());
        hasher.update(&self.public_key);
        hasher.update((self.node_public_key.len() as u32).to_be_bytes());
        hasher.update(&self.node_public_key);
        hasher.update((self.host.len() as u32).to_be_bytes());
        hasher.update(self.host.as_bytes());

        let result = hasher.finalize();
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&result);
        hash
    }

    /// Does the stored hash match the content?
    pub fn is_sealed(&self) -> bool {
        self.hash == self.compute_hash()
    }

    /// Is this the genesis block?
    pub fn is_genesis(&self) -> bool {
        self.id == GENESIS_BLOCK_ID
    }
}

/// Chain-head record (the "info block").
///
/// Must always reference a block that exists in storage.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChainHead {
    /// Id of the highest committed block.
    pub block_id: u64,
    /// Hash of that block.
    pub hash: Hash,
    /// Time of that block.
    pub time: u64,
}

impl ChainHead {
    /// Head pointing at `block`.
    pub fn for_block(block: &Block) -> Self {
        Self {
            block_id: block.id,
            hash: block.hash,
            time: block.time,
        }
    }
}

/// Outcome of probing one peer.
#[derive(Debug)]
pub struct ProbeResult {
    /// Address as given by the caller.
    pub address: PeerAddress,
    /// Reported head or the reason the probe failed.
    pub outcome: Result<u64, ProbeError>,
}

impl ProbeResult {
    /// Successful probe.
    pub fn head(address: PeerAddress, head_block_id: u64) -> Self {
        Self {
            address,
            outcome: Ok(head_block_id),
        }
    }

    /// Failed probe.
    pub fn failed(address: PeerAddress, error: ProbeError) -> Self {
        Self {
            address,
            outcome: Err(error),
        }
    }
}

/// Failed probe kept for the aggregate error.
#[derive(Debug)]
pub struct ProbeFailure {
    /// Peer that failed.
    pub address: PeerAddress,
    /// Why.
    pub error: ProbeError,
}

/// Peer holding the highest head.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BestHost {
    /// Address as given by the caller.
    pub address: PeerAddress,
    /// Head block id reported by that peer.
    pub head_block_id: u64,
}

/// Result of a genesis commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Block #1 and the chain head were written.
    Committed,
    /// Block #1 already existed; nothing was written.
    AlreadyPresent,
}

/// Where the bootstrapper is in its per-call state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BootstrapStage {
    /// Nothing done yet.
    Start,
    /// Reading the embedded block or the export file.
    ReadSource,
    /// Decoding the envelope.
    Decode,
    /// Writing block #1.
    CommitBlock,
    /// Pointing the chain head at block #1.
    CommitHead,
    /// Both records written.
    Done,
}

impl std::fmt::Display for BootstrapStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BootstrapStage::Start => "start",
            BootstrapStage::ReadSource => "read-source",
            BootstrapStage::Decode => "decode",
            BootstrapStage::CommitBlock => "commit-block",
            BootstrapStage::CommitHead => "commit-head",
            BootstrapStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Local chain position relative to the best peer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncStatus {
    /// No peer is ahead of us.
    UpToDate {
        /// Local head block id.
        local: u64,
    },
    /// `host` is ahead and should be synced from.
    Behind {
        /// Peer to sync from.
        host: PeerAddress,
        /// Local head block id.
        local: u64,
        /// Peer's head block id.
        remote: u64,
    },
}
