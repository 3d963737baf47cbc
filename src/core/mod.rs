//! Core types and traits for rftime
//!
//! This module contains the error type, node configuration and serde helpers
//! used throughout the library.

pub mod error;
pub mod serde;
pub mod types;

pub use self::error::{Error, Result};
pub use self::types::{
    Address, CrcLength, DataRate, NodeConfig, PaLevel, RadioConfig, SyncBound, MAX_CHANNEL,
    MAX_PAYLOAD_SIZE,
};

/// Default per-attempt poll window in milliseconds
pub const DEFAULT_POLL_TIMEOUT_MS: u32 = 1000;

/// Default number of consecutive failures between status flushes
pub const DEFAULT_FLUSH_EVERY: u32 = 30;
