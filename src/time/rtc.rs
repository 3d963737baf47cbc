use tracing::debug;

use super::Timestamp;

/// Battery-backed real-time clock holding the node's notion of "now"
///
/// Last write wins; there is no transactional behaviour.
pub trait RtcStore {
    /// Returns the current time held by the clock
    fn get(&self) -> Timestamp;

    /// Replaces the current time held by the clock
    fn set(&mut self, timestamp: Timestamp);
}

/// In-memory clock store, counting every write
#[derive(Debug, Clone, Default)]
pub struct MemoryRtc {
    current: Timestamp,
    writes: usize,
}

impl MemoryRtc {
    /// Creates a store reading as the given time
    pub fn new(initial: Timestamp) -> Self {
        MemoryRtc {
            current: initial,
            writes: 0,
        }
    }

    /// Number of `set` calls received so far
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl RtcStore for MemoryRtc {
    fn get(&self) -> Timestamp {
        self.current
    }

    fn set(&mut self, timestamp: Timestamp) {
        debug!(%timestamp, "RTC set");
        self.current = timestamp;
        self.writes += 1;
    }
}
