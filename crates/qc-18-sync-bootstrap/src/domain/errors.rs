//! # Domain Errors
//!
//! Error types for Sync Bootstrap.
//!
//! Per-peer failures (`ProbeError`) are folded into `SyncError` only when
//! every peer failed.

use super::entities::{BootstrapStage, ProbeFailure};
use std::path::PathBuf;
use thiserror::Error;

/// Wire codec failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    /// Request is not a known 2-byte tag.
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// Head response is not exactly the expected size.
    #[error("Malformed response: expected {expected} bytes, got {actual}")]
    MalformedResponse {
        /// Required length
        expected: usize,
        /// Length received
        actual: usize,
    },

    /// Genesis envelope cannot be decoded.
    #[error("Malformed genesis envelope: {0}")]
    MalformedEnvelope(String),
}

/// Failure of a single probe. Never aborts the overall selection.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// A connect, write or read step ran past its deadline.
    #[error("Probe of {address} timed out during {step} after {after_ms}ms")]
    Timeout {
        /// Peer address
        address: String,
        /// Step that stalled
        step: &'static str,
        /// Deadline in milliseconds
        after_ms: u64,
    },

    /// Connection refused, reset, or closed early.
    #[error("Connection to {address} failed: {reason}")]
    ConnectionFailed {
        /// Peer address
        address: String,
        /// Underlying I/O error
        reason: String,
    },

    /// Peer answered with bytes the codec rejects.
    #[error("Peer {address} sent a malformed reply: {source}")]
    Malformed {
        /// Peer address
        address: String,
        /// Decode failure
        #[source]
        source: CodecError,
    },
}

/// Storage collaborator failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Backend rejected or failed the call.
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// Chain head would reference a block that is not stored.
    #[error("Chain head references missing block {block_id}")]
    MissingBlock {
        /// Referenced block id
        block_id: u64,
    },
}

/// Errors surfaced to callers of the selector and the bootstrapper.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Host list was empty.
    #[error("No hosts provided")]
    NoHostsProvided,

    /// Every probe failed.
    #[error("All {} hosts unreachable", .0.len())]
    AllHostsUnreachable(Vec<ProbeFailure>),

    /// Export file does not exist.
    #[error("Genesis file not found: {0}")]
    FileNotFound(PathBuf),

    /// Export file exists but could not be read.
    #[error("Cannot read genesis file {path}: {source}")]
    GenesisRead {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Export file could not be decoded.
    ///
    /// Built explicitly at envelope call sites; probe codec errors stay
    /// inside `ProbeError::Malformed`.
    #[error(transparent)]
    MalformedEnvelope(CodecError),

    /// Block #1 was written but the chain head could not be updated.
    #[error("Inconsistent genesis state at {stage}: {reason}")]
    InconsistentGenesisState {
        /// Stage that failed
        stage: BootstrapStage,
        /// Underlying cause
        reason: String,
    },

    /// Storage call failed before anything was written.
    #[error("Storage failed at {stage}: {source}")]
    Storage {
        /// Stage that failed
        stage: BootstrapStage,
        /// Underlying cause
        #[source]
        source: StoreError,
    },

    /// I/O failure other than a missing file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Cancellation token fired.
    #[error("Operation cancelled")]
    Cancelled,
}

impl SyncError {
    /// Should node startup halt on this error?
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SyncError::InconsistentGenesisState { .. }
                | SyncError::MalformedEnvelope(_)
                | SyncError::FileNotFound(_)
                | SyncError::GenesisRead { .. }
                | SyncError::Storage { .. }
        )
    }

    /// Per-peer failures, if this is the aggregate error.
    pub fn probe_failures(&self) -> &[ProbeFailure] {
        match self {
            SyncError::AllHostsUnreachable(failures) => failures,
            _ => &[],
        }
    }
}
