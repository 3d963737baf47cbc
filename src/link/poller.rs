use bytes::{Bytes, BytesMut};
use tracing::{debug, info};

use super::{MillisClock, Radio};
use crate::core::{RadioConfig, Result};
use crate::time::util::elapsed_ms;

/// Result of one poll of the link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// One full payload of the configured size
    Packet(Bytes),
    /// Nothing arrived within the window
    Timeout,
}

/// Source of raw packets for the sync state machine
pub trait Link {
    /// Waits up to `timeout_ms` for one packet
    fn poll(&mut self, timeout_ms: u32) -> PollOutcome;

    /// Current value of the link's millisecond counter
    fn millis(&self) -> u32;

    /// Size of the payloads the link hands out
    fn payload_size(&self) -> usize;
}

/// Busy-waiting link poller over an owned radio and millisecond counter
pub struct LinkPoller<R, C> {
    radio: R,
    clock: C,
    payload_size: usize,
}

impl<R: Radio, C: MillisClock> LinkPoller<R, C> {
    /// Configures the radio and creates a poller for it
    pub fn new(mut radio: R, clock: C, config: &RadioConfig) -> Result<Self> {
        radio.configure(config)?;
        info!(
            channel = config.channel,
            payload_size = config.payload_size,
            "radio configured"
        );

        Ok(LinkPoller {
            radio,
            clock,
            payload_size: config.payload_size,
        })
    }

    /// Waits up to `timeout_ms` for one packet
    ///
    /// The radio listens only for the duration of the call. Availability is
    /// rechecked without sleeping until a payload is waiting or more than
    /// `timeout_ms` has elapsed on the counter.
    pub fn poll(&mut self, timeout_ms: u32) -> PollOutcome {
        self.radio.start_listening();
        let started = self.clock.millis();

        let mut available = false;
        loop {
            if self.radio.is_data_available() {
                available = true;
                break;
            }
            if elapsed_ms(started, self.clock.millis()) > timeout_ms {
                break;
            }
        }

        let outcome = if available {
            let mut buf = BytesMut::zeroed(self.payload_size);
            self.radio.read(&mut buf);
            PollOutcome::Packet(buf.freeze())
        } else {
            debug!(timeout_ms, "poll timed out");
            PollOutcome::Timeout
        };

        self.radio.stop_listening();
        outcome
    }

    /// Configured payload size
    pub fn payload_size(&self) -> usize {
        self.payload_size
    }

    /// Returns the radio
    pub fn radio(&self) -> &R {
        &self.radio
    }

    /// Returns the radio mutably
    pub fn radio_mut(&mut self) -> &mut R {
        &mut self.radio
    }

    /// Returns the millisecond counter
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Gives back the radio and counter
    pub fn into_parts(self) -> (R, C) {
        (self.radio, self.clock)
    }
}

impl<R: Radio, C: MillisClock> Link for LinkPoller<R, C> {
    fn poll(&mut self, timeout_ms: u32) -> PollOutcome {
        LinkPoller::poll(self, timeout_ms)
    }

    fn millis(&self) -> u32 {
        self.clock.millis()
    }

    fn payload_size(&self) -> usize {
        self.payload_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Error;
    use crate::link::sim::{ManualClock, SimulatedRadio, Transmission};

    fn poller(radio: SimulatedRadio, clock: ManualClock) -> LinkPoller<SimulatedRadio, ManualClock> {
        let config = RadioConfig::default();
        LinkPoller::new(radio, clock, &config).unwrap()
    }

    #[test]
    fn test_poll_returns_packet() {
        let payload = vec![0xABu8; 32];
        let radio = SimulatedRadio::new().with_transmission(Transmission::delayed(3, payload.clone()));
        let mut poller = poller(radio, ManualClock::new(0, 1));

        match poller.poll(1000) {
            PollOutcome::Packet(bytes) => assert_eq!(&bytes[..], &payload[..]),
            PollOutcome::Timeout => panic!("expected a packet"),
        }
        assert!(!poller.radio().is_listening());
        assert_eq!(poller.radio().reads(), 1);
    }

    #[test]
    fn test_poll_reads_configured_size() {
        let radio = SimulatedRadio::new().with_transmission(Transmission::frame(vec![1u8, 2, 3]));
        let config = RadioConfig {
            payload_size: 10,
            ..RadioConfig::default()
        };
        let mut poller = LinkPoller::new(radio, ManualClock::new(0, 1), &config).unwrap();

        match poller.poll(1000) {
            PollOutcome::Packet(bytes) => {
                assert_eq!(bytes.len(), 10);
                assert_eq!(&bytes[..3], &[1, 2, 3]);
            }
            PollOutcome::Timeout => panic!("expected a packet"),
        }
    }

    #[test]
    fn test_poll_timeout_window() {
        let clock = ManualClock::new(5_000, 1);
        let mut poller = poller(SimulatedRadio::new(), clock);

        let start = poller.clock().now();
        assert_eq!(poller.poll(1000), PollOutcome::Timeout);
        let elapsed = elapsed_ms(start, poller.clock().now());

        assert!(elapsed >= 1000, "returned early after {} ms", elapsed);
        assert!(elapsed <= 1000 + 2, "returned late after {} ms", elapsed);
        assert!(!poller.radio().is_listening());
        assert_eq!(poller.radio().listen_sessions(), 1);
    }

    #[test]
    fn test_poll_timeout_across_counter_wrap() {
        let clock = ManualClock::new(u32::MAX - 400, 1);
        let mut poller = poller(SimulatedRadio::new(), clock);

        let start = poller.clock().now();
        assert_eq!(poller.poll(1000), PollOutcome::Timeout);
        let elapsed = elapsed_ms(start, poller.clock().now());

        // The counter wrapped mid-wait; a direct comparison would have returned at once
        assert!(poller.clock().now() < start);
        assert!(elapsed >= 1000 && elapsed <= 1002, "elapsed {} ms", elapsed);
    }

    #[test]
    fn test_poll_packet_after_wrap() {
        let radio = SimulatedRadio::new().with_transmission(Transmission::delayed(600, vec![7u8; 32]));
        let mut poller = poller(radio, ManualClock::new(u32::MAX - 100, 1));

        assert!(matches!(poller.poll(1000), PollOutcome::Packet(_)));
    }

    #[test]
    fn test_configure_failure_is_reported() {
        let config = RadioConfig {
            payload_size: 0,
            ..RadioConfig::default()
        };
        let result = LinkPoller::new(SimulatedRadio::new(), ManualClock::new(0, 1), &config);
        assert!(matches!(result, Err(Error::Radio(_))));
    }
}
