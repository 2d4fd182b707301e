//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements outbound port traits: TCP probing and an in-memory ledger.

mod memory_store;
mod tcp_probe;

pub use memory_store::InMemoryChainStore;
pub use tcp_probe::TcpHeadProbe;
