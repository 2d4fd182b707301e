//! # Application Module
//!
//! Application services orchestrating the domain and outbound ports.

pub mod bootstrapper;
pub mod collector;
pub mod host_selector;

pub use bootstrapper::{export_first_block, GenesisBootstrapper};
pub use collector::BlockCollector;
pub use host_selector::{select_best, with_default_port, HostSelector};
