use tracing::{debug, info, warn};

use super::packet::{DecodeError, FieldValidation, TimePacket, WireFormat};
use crate::core::{Error, NodeConfig, Result, SyncBound};
use crate::link::{Link, PollOutcome};
use crate::status::{AttemptOutcome, FlashPattern, StatusReporter, StatusSink, SyncStatus};
use crate::time::util::elapsed_ms;
use crate::time::{RtcStore, Timestamp};

/// Where the sync state machine currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Not synchronizing
    Idle,
    /// Waiting on the link
    Polling {
        /// Attempt number within the current run, starting at 1
        attempt: u64,
    },
    /// Time was written to the RTC
    Committed(Timestamp),
}

/// Client side of the time sync protocol
///
/// Polls the link, decodes what arrives and commits the first valid time to
/// the RTC. Timeouts and rejected packets both lead straight to another poll.
pub struct TimeSync<L, S, K> {
    link: L,
    rtc: S,
    reporter: StatusReporter<K>,
    format: WireFormat,
    validation: FieldValidation,
    poll_timeout_ms: u32,
    flush_every: u32,
    bound: SyncBound,
    state: SyncState,
    status: SyncStatus,
    run_attempts: u64,
}

impl<L: Link, S: RtcStore, K: StatusSink> TimeSync<L, S, K> {
    /// Creates a state machine over an already configured link
    ///
    /// The link must hand out payloads of the configured size.
    pub fn new(link: L, rtc: S, sink: K, config: &NodeConfig) -> Result<Self> {
        config.validate()?;
        if link.payload_size() != config.radio.payload_size {
            return Err(Error::config(format!(
                "link delivers {} byte payloads, {} configured",
                link.payload_size(),
                config.radio.payload_size
            )));
        }

        Ok(TimeSync {
            link,
            rtc,
            reporter: StatusReporter::new(sink, config.status_enabled),
            format: config.format,
            validation: config.validation,
            poll_timeout_ms: config.poll_timeout_ms(),
            flush_every: config.flush_every,
            bound: config.bound,
            state: SyncState::Idle,
            status: SyncStatus::new(),
            run_attempts: 0,
        })
    }

    /// Replaces the limit on synchronization runs
    pub fn with_bound(mut self, bound: SyncBound) -> Self {
        self.bound = bound;
        self
    }

    /// Polls until a valid time packet arrives, commits it and returns it
    ///
    /// Blocks for as long as that takes. With a [`SyncBound`] configured,
    /// gives up with [`Error::SyncAborted`] once the bound is reached; the
    /// RTC is untouched in that case.
    pub fn synchronize(&mut self) -> Result<Timestamp> {
        info!(format = ?self.format, timeout_ms = self.poll_timeout_ms, "synchronizing");
        self.run_attempts = 0;

        let mut last = self.link.millis();
        let mut elapsed: u64 = 0;

        loop {
            if let AttemptOutcome::Synchronized(timestamp) = self.attempt() {
                return Ok(timestamp);
            }

            let now = self.link.millis();
            elapsed += elapsed_ms(last, now) as u64;
            last = now;

            if self.bound.exceeded(self.run_attempts, elapsed) {
                warn!(
                    attempts = self.run_attempts,
                    elapsed_ms = elapsed,
                    "giving up on synchronization"
                );
                self.state = SyncState::Idle;
                return Err(Error::SyncAborted {
                    attempts: self.run_attempts,
                    elapsed_ms: elapsed,
                });
            }
        }
    }

    /// Performs one poll and, on a valid packet, commits it to the RTC
    pub fn attempt(&mut self) -> AttemptOutcome {
        self.run_attempts += 1;
        self.state = SyncState::Polling {
            attempt: self.run_attempts,
        };

        let outcome = match self.link.poll(self.poll_timeout_ms) {
            PollOutcome::Timeout => AttemptOutcome::Timeout,
            PollOutcome::Packet(payload) => match self.decode(&payload) {
                Ok(timestamp) => {
                    self.rtc.set(timestamp);
                    self.state = SyncState::Committed(timestamp);
                    AttemptOutcome::Synchronized(timestamp)
                }
                Err(e) => {
                    debug!(attempt = self.run_attempts, error = %e, "packet rejected");
                    AttemptOutcome::Rejected
                }
            },
        };

        self.status.record(outcome);
        match outcome {
            AttemptOutcome::Synchronized(timestamp) => {
                info!(%timestamp, attempts = self.run_attempts, "time synchronized");
                self.reporter.line(&["synchronized".into(), timestamp.into()]);
                self.reporter.flash(FlashPattern::SYNCHRONIZED);
            }
            _ => {
                if self.status.consecutive_failures() % self.flush_every == 0 {
                    self.flush(outcome);
                }
            }
        }

        outcome
    }

    /// Decodes a payload into the time it carries
    fn decode(&self, payload: &[u8]) -> std::result::Result<Timestamp, DecodeError> {
        TimePacket::decode_with(self.format, payload, self.validation)?.timestamp()
    }

    /// Periodic status output while failing
    fn flush(&mut self, last: AttemptOutcome) {
        let failures = self.status.consecutive_failures();
        let timeouts = self.status.timeouts();
        let rejections = self.status.rejections();
        debug!(failures, timeouts, rejections, "status flush");

        match self.status.last_sync() {
            Some(last_sync) => self.reporter.line(&[
                "failures".into(),
                failures.into(),
                "timeouts".into(),
                timeouts.into(),
                "rejected".into(),
                rejections.into(),
                "last sync".into(),
                last_sync.into(),
            ]),
            None => self.reporter.line(&[
                "failures".into(),
                failures.into(),
                "timeouts".into(),
                timeouts.into(),
                "rejected".into(),
                rejections.into(),
            ]),
        }

        let pattern = match last {
            AttemptOutcome::Rejected => FlashPattern::REJECTED,
            _ => FlashPattern::TIMEOUT,
        };
        self.reporter.flash(pattern);
    }

    /// Current state
    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Attempt history
    pub fn status(&self) -> &SyncStatus {
        &self.status
    }

    /// Returns the link
    pub fn link(&self) -> &L {
        &self.link
    }

    /// Returns the RTC store
    pub fn rtc(&self) -> &S {
        &self.rtc
    }

    /// Returns the status reporter
    pub fn reporter(&self) -> &StatusReporter<K> {
        &self.reporter
    }

    /// Returns the reporter mutably, e.g. to switch output on or off
    pub fn reporter_mut(&mut self) -> &mut StatusReporter<K> {
        &mut self.reporter
    }

    /// Gives back the link, RTC store and sink
    pub fn into_parts(self) -> (L, S, K) {
        (self.link, self.rtc, self.reporter.into_sink())
    }
}
