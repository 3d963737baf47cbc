//! Simulated transceiver and millisecond counter
//!
//! Stand-ins for hardware, used by tests and demos. The simulated radio
//! plays back a script with one entry per listening session, optionally
//! losing frames at random.

use std::cell::Cell;
use std::collections::VecDeque;

use bytes::Bytes;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

use super::{MillisClock, Radio};
use crate::core::{Error, RadioConfig, Result, MAX_PAYLOAD_SIZE};

/// Millisecond counter that advances by a fixed step on every read
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<u32>,
    step: u32,
}

impl ManualClock {
    /// Creates a counter starting at `start`, advancing `step` ms per read
    pub fn new(start: u32, step: u32) -> Self {
        ManualClock {
            now: Cell::new(start),
            step,
        }
    }

    /// Current value, without advancing
    pub fn now(&self) -> u32 {
        self.now.get()
    }

    /// Moves the counter forward, wrapping at `u32::MAX`
    pub fn advance(&self, ms: u32) {
        self.now.set(self.now.get().wrapping_add(ms));
    }
}

impl MillisClock for ManualClock {
    fn millis(&self) -> u32 {
        let current = self.now.get();
        self.advance(self.step);
        current
    }
}

/// What the simulated transmitter does during one listening session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transmission {
    /// Nothing is received
    Silence,
    /// A payload arrives after `after_checks` availability checks
    Frame {
        /// Number of negative availability checks before arrival
        after_checks: u32,
        /// Bytes delivered to `read`
        payload: Bytes,
    },
}

impl Transmission {
    /// A payload available on the first check
    pub fn frame(payload: impl Into<Bytes>) -> Self {
        Self::delayed(0, payload)
    }

    /// A payload available after the given number of checks
    pub fn delayed(after_checks: u32, payload: impl Into<Bytes>) -> Self {
        Transmission::Frame {
            after_checks,
            payload: payload.into(),
        }
    }
}

/// Scripted transceiver
#[derive(Debug, Default)]
pub struct SimulatedRadio {
    script: VecDeque<Transmission>,
    current: Option<Transmission>,
    checks: u32,
    listening: bool,
    config: Option<RadioConfig>,
    listen_sessions: usize,
    reads: usize,
    lost: usize,
    loss: Option<(f64, StdRng)>,
}

impl SimulatedRadio {
    /// Creates a radio that never receives anything
    pub fn new() -> Self {
        SimulatedRadio::default()
    }

    /// Appends one listening session to the script
    pub fn with_transmission(mut self, transmission: Transmission) -> Self {
        self.script.push_back(transmission);
        self
    }

    /// Appends several listening sessions to the script
    pub fn with_script(mut self, script: impl IntoIterator<Item = Transmission>) -> Self {
        self.script.extend(script);
        self
    }

    /// Drops each scripted frame with probability `probability`, seeded for repeatability
    pub fn with_loss(mut self, probability: f64, seed: u64) -> Self {
        self.loss = Some((probability.clamp(0.0, 1.0), StdRng::seed_from_u64(seed)));
        self
    }

    /// Appends one listening session to the script
    pub fn push(&mut self, transmission: Transmission) {
        self.script.push_back(transmission);
    }

    /// Whether the radio is currently in receive mode
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Number of times receive mode was entered
    pub fn listen_sessions(&self) -> usize {
        self.listen_sessions
    }

    /// Number of payloads read
    pub fn reads(&self) -> usize {
        self.reads
    }

    /// Number of frames dropped by simulated loss
    pub fn lost(&self) -> usize {
        self.lost
    }

    /// Configuration applied by the last `configure`
    pub fn config(&self) -> Option<&RadioConfig> {
        self.config.as_ref()
    }

    /// Scripted sessions not yet played
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl Radio for SimulatedRadio {
    fn configure(&mut self, config: &RadioConfig) -> Result<()> {
        if config.payload_size == 0 || config.payload_size > MAX_PAYLOAD_SIZE {
            return Err(Error::radio(format!(
                "unsupported payload size {}",
                config.payload_size
            )));
        }
        self.config = Some(config.clone());
        Ok(())
    }

    fn start_listening(&mut self) {
        let mut next = self.script.pop_front().unwrap_or(Transmission::Silence);

        let dropped = matches!(next, Transmission::Frame { .. })
            && self
                .loss
                .as_mut()
                .map_or(false, |(probability, rng)| rng.gen_bool(*probability));
        if dropped {
            trace!("simulated frame lost");
            self.lost += 1;
            next = Transmission::Silence;
        }

        self.current = Some(next);
        self.checks = 0;
        self.listening = true;
        self.listen_sessions += 1;
    }

    fn stop_listening(&mut self) {
        self.listening = false;
        self.current = None;
    }

    fn is_data_available(&mut self) -> bool {
        if !self.listening {
            return false;
        }

        let available = match &self.current {
            Some(Transmission::Frame { after_checks, .. }) => self.checks >= *after_checks,
            _ => false,
        };
        self.checks = self.checks.saturating_add(1);
        available
    }

    fn read(&mut self, buf: &mut [u8]) {
        buf.fill(0);
        if let Some(Transmission::Frame { payload, .. }) = self.current.take() {
            let len = payload.len().min(buf.len());
            buf[..len].copy_from_slice(&payload[..len]);
            self.reads += 1;
        }
    }
}
