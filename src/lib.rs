//! rftime: wall-clock time over a packet radio link
//!
//! A transmitter periodically broadcasts the current date and time in a small
//! fixed-size radio payload. A receiving node listens for it, validates and
//! decodes the payload, and commits the time to its battery-backed real-time
//! clock.
//!
//! # Examples
//!
//! ```
//! use rftime::core::NodeConfig;
//! use rftime::link::sim::{ManualClock, SimulatedRadio, Transmission};
//! use rftime::link::LinkPoller;
//! use rftime::protocol::{TimePacket, TimeSync, WireFormat};
//! use rftime::status::TracingSink;
//! use rftime::time::{CalendarFields, MemoryRtc, RtcStore};
//!
//! let config = NodeConfig::default();
//! let packet = TimePacket::new(CalendarFields::new(2020, 7, 24, 10, 30, 0));
//! let radio = SimulatedRadio::new()
//!     .with_transmission(Transmission::Silence)
//!     .with_transmission(Transmission::frame(packet.encode(WireFormat::Current)));
//!
//! let link = LinkPoller::new(radio, ManualClock::new(0, 1), &config.radio)?;
//! let mut sync = TimeSync::new(link, MemoryRtc::default(), TracingSink, &config)?;
//!
//! let now = sync.synchronize()?;
//! assert_eq!(sync.rtc().get(), now);
//! # Ok::<(), rftime::Error>(())
//! ```

pub mod core;
pub mod link;
pub mod protocol;
pub mod status;
pub mod time;

// Re-export commonly used items
pub use crate::core::{Error, NodeConfig, Result};
pub use crate::link::{LinkPoller, PollOutcome};
pub use crate::protocol::{TimePacket, TimeSync, WireFormat};
pub use crate::time::{CalendarFields, RtcStore, Timestamp};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
