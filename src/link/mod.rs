//! Radio link polling
//!
//! This module defines the transceiver and millisecond-counter seams and the
//! link poller that turns them into "one packet or a timeout".

pub mod asynch;
mod poller;
pub mod sim;

pub use self::poller::{Link, LinkPoller, PollOutcome};

use std::time::Instant;

use crate::core::{RadioConfig, Result};

/// Packet radio transceiver driver
///
/// Once `is_data_available` reports true, exactly one full payload of the
/// configured size can be read.
pub trait Radio {
    /// Applies channel, address, payload size and link parameters
    fn configure(&mut self, config: &RadioConfig) -> Result<()>;

    /// Enters receive mode on the configured address
    fn start_listening(&mut self);

    /// Leaves receive mode
    fn stop_listening(&mut self);

    /// Whether a payload is waiting in the receive queue
    fn is_data_available(&mut self) -> bool;

    /// Reads one payload into `buf`
    fn read(&mut self, buf: &mut [u8]);
}

/// Free-running millisecond counter
///
/// The counter wraps at `u32::MAX`; elapsed time must be computed with
/// wrapping subtraction.
pub trait MillisClock {
    /// Current counter value
    fn millis(&self) -> u32;
}

/// Millisecond counter backed by the host's monotonic clock
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Creates a counter reading zero now
    pub fn new() -> Self {
        SystemClock {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MillisClock for SystemClock {
    fn millis(&self) -> u32 {
        // Truncation gives the same wrapping behaviour as a hardware counter
        self.origin.elapsed().as_millis() as u32
    }
}
