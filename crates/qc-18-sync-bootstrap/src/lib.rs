//! # QC-18 Sync Bootstrap
//!
//! Bootstrap and peer-selection core of the block sync daemon.
//!
//! **Subsystem ID:** 18
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! - Find the peer holding the highest chain head, so the node knows whom
//!   to sync from
//! - Establish block #1 from an export file or the embedded default, and
//!   point the chain head at it
//!
//! ## Guarantees
//!
//! | Concern | Behaviour |
//! |---------|-----------|
//! | Bounded probes | Connect, write and read each time out (1s default) |
//! | Global best | All probes finish before the maximum is picked |
//! | Deterministic ties | Earliest host in the input list wins |
//! | Head consistency | Block #1 is written before the chain head |
//! | Cancellation | Pending probes and file reads abort with `Cancelled` |
//!
//! ## Module Structure
//!
//! ```text
//! qc-18-sync-bootstrap/
//! ├── domain/          # Block, ChainHead, probe results, errors, embedded genesis
//! ├── codec/           # Probe wire format + genesis export envelope
//! ├── ports/           # API traits (inbound) + ChainStore/HeadProbe (outbound)
//! ├── adapters/        # TcpHeadProbe, InMemoryChainStore
//! ├── application/     # HostSelector, GenesisBootstrapper, BlockCollector
//! └── config.rs        # SyncConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod application;
pub mod codec;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::{InMemoryChainStore, TcpHeadProbe};
pub use application::{
    export_first_block, select_best, with_default_port, BlockCollector, GenesisBootstrapper,
    HostSelector,
};
pub use codec::{
    decode_genesis_envelope, decode_head_response, decode_request, encode_genesis_envelope,
    encode_head_response, encode_request, RequestKind,
};
pub use config::{ConfigError, GenesisPolicy, SyncConfig};
pub use domain::{
    default_genesis_block, BestHost, Block, BootstrapStage, ChainHead, CodecError,
    CommitOutcome, Hash, PeerAddress, ProbeError, ProbeFailure, ProbeResult, StoreError,
    SyncError, SyncStatus, GENESIS_BLOCK_ID,
};
pub use ports::{ChainStore, GenesisApi, HeadProbe, HostSelectionApi, MockHeadProbe};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
