//! Calendar time and persistent clock storage
//!
//! This module turns decoded wire fields into seconds since the epoch and
//! defines the RTC store the synchronized time is committed to.
//!
//! # Examples
//!
//! ```
//! use rftime::time::{CalendarFields, MemoryRtc, RtcStore};
//!
//! let fields = CalendarFields::new(2020, 7, 24, 10, 30, 0);
//! let timestamp = fields.to_timestamp().unwrap();
//!
//! let mut rtc = MemoryRtc::default();
//! rtc.set(timestamp);
//! assert_eq!(rtc.get().to_string(), "2020-07-24 10:30:00");
//! ```

mod calendar;
mod rtc;

pub use self::calendar::{CalendarFields, Timestamp, EPOCH_YEAR};
pub use self::rtc::{MemoryRtc, RtcStore};

/// Utility functions for millisecond counters
pub mod util {
    /// Milliseconds elapsed between two readings of a free-running `u32` counter
    ///
    /// Correct across a single wrap of the counter.
    pub fn elapsed_ms(start: u32, now: u32) -> u32 {
        now.wrapping_sub(start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elapsed_without_wrap() {
        assert_eq!(util::elapsed_ms(1_000, 2_500), 1_500);
        assert_eq!(util::elapsed_ms(7, 7), 0);
    }

    #[test]
    fn test_elapsed_across_wrap() {
        assert_eq!(util::elapsed_ms(u32::MAX - 9, 10), 20);
        assert_eq!(util::elapsed_ms(u32::MAX, 0), 1);
    }
}
