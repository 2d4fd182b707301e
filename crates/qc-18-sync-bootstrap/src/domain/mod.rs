//! # Domain Module
//!
//! Core domain types for Sync Bootstrap.

pub mod entities;
pub mod errors;
pub mod genesis;

pub use entities::*;
pub use errors::*;
pub use genesis::*;
