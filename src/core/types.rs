use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{Error, Result};
use crate::protocol::{FieldValidation, WireFormat};

/// Listening address of the node (5-byte pipe address)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(pub [u8; 5]);

impl Address {
    /// Returns the raw address bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Default for Address {
    fn default() -> Self {
        Address(*b"clock")
    }
}

/// Transmit power level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaLevel {
    Min,
    Low,
    High,
    Max,
}

/// Over-the-air data rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataRate {
    Kbps250,
    Mbps1,
    Mbps2,
}

/// Hardware CRC length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrcLength {
    Disabled,
    Crc8,
    Crc16,
}

/// Radio parameters handed to the transceiver driver once at setup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadioConfig {
    /// RF channel
    pub channel: u8,
    /// Fixed listening address
    pub address: Address,
    /// Fixed payload size in bytes
    pub payload_size: usize,
    /// Transmit power level
    pub pa_level: PaLevel,
    /// Data rate
    pub data_rate: DataRate,
    /// Auto-retransmit delay, in 250us steps
    pub retry_delay: u8,
    /// Auto-retransmit count
    pub retry_count: u8,
    /// CRC length
    pub crc: CrcLength,
    /// Whether auto-acknowledgement is enabled
    pub auto_ack: bool,
}

impl Default for RadioConfig {
    fn default() -> Self {
        RadioConfig {
            channel: 76,
            address: Address::default(),
            payload_size: MAX_PAYLOAD_SIZE,
            pa_level: PaLevel::Low,
            data_rate: DataRate::Kbps250,
            retry_delay: 15,
            retry_count: 15,
            crc: CrcLength::Crc16,
            auto_ack: true,
        }
    }
}

/// Largest payload the transceiver can carry
pub const MAX_PAYLOAD_SIZE: usize = 32;

/// Highest usable RF channel
pub const MAX_CHANNEL: u8 = 125;

/// Optional upper bound on a synchronization run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncBound {
    /// Maximum number of poll attempts
    pub max_attempts: Option<u64>,
    /// Maximum total time spent polling
    #[serde(serialize_with = "super::serde::serialize_opt_duration")]
    #[serde(deserialize_with = "super::serde::deserialize_opt_duration")]
    pub max_duration: Option<Duration>,
}

impl SyncBound {
    /// No bound: retry until a valid packet arrives
    pub fn unbounded() -> Self {
        SyncBound::default()
    }

    /// Whether any limit is set
    pub fn is_bounded(&self) -> bool {
        self.max_attempts.is_some() || self.max_duration.is_some()
    }

    /// Whether the given progress has reached a limit
    pub fn exceeded(&self, attempts: u64, elapsed_ms: u64) -> bool {
        let attempts_hit = self.max_attempts.map_or(false, |max| attempts >= max);
        let duration_hit = self
            .max_duration
            .map_or(false, |max| elapsed_ms >= max.as_millis() as u64);
        attempts_hit || duration_hit
    }
}

/// Configuration for a receiving node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Transceiver parameters
    pub radio: RadioConfig,
    /// Wire format the transmitter emits
    pub format: WireFormat,
    /// How decoded fields are checked
    pub validation: FieldValidation,
    /// Per-attempt poll window
    #[serde(serialize_with = "super::serde::serialize_duration")]
    #[serde(deserialize_with = "super::serde::deserialize_duration")]
    pub poll_timeout: Duration,
    /// Consecutive failures between status flushes
    pub flush_every: u32,
    /// Whether status output is emitted at all
    pub status_enabled: bool,
    /// Optional limit on a synchronization run
    pub bound: SyncBound,
}

impl Default for NodeConfig {
    fn default() -> Self {
        NodeConfig {
            radio: RadioConfig::default(),
            format: WireFormat::Current,
            validation: FieldValidation::Permissive,
            poll_timeout: Duration::from_millis(super::DEFAULT_POLL_TIMEOUT_MS as u64),
            flush_every: super::DEFAULT_FLUSH_EVERY,
            status_enabled: true,
            bound: SyncBound::unbounded(),
        }
    }
}

impl NodeConfig {
    /// Creates a configuration for the given wire format, sizing the payload to match
    pub fn for_format(format: WireFormat) -> Self {
        NodeConfig {
            radio: RadioConfig {
                payload_size: format.payload_len(),
                ..RadioConfig::default()
            },
            format,
            ..NodeConfig::default()
        }
    }

    /// Poll window in milliseconds, as used by the link poller
    pub fn poll_timeout_ms(&self) -> u32 {
        self.poll_timeout.as_millis().min(u32::MAX as u128) as u32
    }

    /// Checks that the configuration is usable:
    /// - poll timeout and flush interval are non-zero
    /// - payload size fits both the wire format and the transceiver
    /// - channel is in range
    pub fn validate(&self) -> Result<()> {
        if self.poll_timeout.is_zero() {
            return Err(Error::config("Poll timeout must be non-zero"));
        }

        if self.flush_every == 0 {
            return Err(Error::config("Status flush interval must be non-zero"));
        }

        if self.radio.payload_size < self.format.min_len() {
            return Err(Error::config(format!(
                "Payload size {} too small for {:?} format (needs {})",
                self.radio.payload_size,
                self.format,
                self.format.min_len()
            )));
        }

        if self.radio.payload_size > MAX_PAYLOAD_SIZE {
            return Err(Error::config(format!(
                "Payload size {} exceeds transceiver maximum {}",
                self.radio.payload_size, MAX_PAYLOAD_SIZE
            )));
        }

        if self.radio.channel > MAX_CHANNEL {
            return Err(Error::config(format!(
                "Channel {} out of range",
                self.radio.channel
            )));
        }

        Ok(())
    }
}
