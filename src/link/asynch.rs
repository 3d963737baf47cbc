//! Cooperative link poller for async runtimes
//!
//! Same contract as [`LinkPoller`](super::LinkPoller): listen for the
//! duration of the call, return one payload or a timeout. Instead of spinning
//! on a counter it yields to the runtime between availability checks and
//! lets `tokio::time::timeout` bound the wait.

use std::time::Duration;

use bytes::BytesMut;
use tracing::{debug, info};

use super::{PollOutcome, Radio};
use crate::core::{RadioConfig, Result};

/// Link poller that yields between availability checks
pub struct AsyncLinkPoller<R> {
    radio: R,
    payload_size: usize,
}

impl<R: Radio> AsyncLinkPoller<R> {
    /// Configures the radio and creates a poller for it
    pub fn new(mut radio: R, config: &RadioConfig) -> Result<Self> {
        radio.configure(config)?;
        info!(
            channel = config.channel,
            payload_size = config.payload_size,
            "radio configured"
        );

        Ok(AsyncLinkPoller {
            radio,
            payload_size: config.payload_size,
        })
    }

    /// Waits up to `timeout` for one packet
    pub async fn poll(&mut self, timeout: Duration) -> PollOutcome {
        self.radio.start_listening();

        let radio = &mut self.radio;
        let wait = async move {
            while !radio.is_data_available() {
                tokio::task::yield_now().await;
            }
        };
        let arrived = tokio::time::timeout(timeout, wait).await.is_ok();

        let outcome = if arrived {
            let mut buf = BytesMut::zeroed(self.payload_size);
            self.radio.read(&mut buf);
            PollOutcome::Packet(buf.freeze())
        } else {
            debug!(?timeout, "poll timed out");
            PollOutcome::Timeout
        };

        self.radio.stop_listening();
        outcome
    }

    /// Returns the radio
    pub fn radio(&self) -> &R {
        &self.radio
    }

    /// Gives back the radio
    pub fn into_inner(self) -> R {
        self.radio
    }
}
