//! Status reporting
//!
//! Console output and LED indication for the sync loop. Output is a sequence
//! of [`StatusValue`]s (integers, text, timestamps) handed to a
//! [`StatusSink`]; the [`StatusReporter`] wrapper can switch it off entirely
//! at runtime. Nothing reported here affects protocol state.

mod sync_status;

pub use self::sync_status::{AttemptOutcome, SyncStatus};

use std::fmt;

use tracing::info;

use crate::time::Timestamp;

/// A value the status output knows how to render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusValue<'a> {
    Int(i64),
    Text(&'a str),
    Time(Timestamp),
}

impl fmt::Display for StatusValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusValue::Int(n) => write!(f, "{}", n),
            StatusValue::Text(s) => f.write_str(s),
            StatusValue::Time(t) => write!(f, "{}", t),
        }
    }
}

macro_rules! impl_int_status_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for StatusValue<'_> {
                fn from(n: $ty) -> Self {
                    StatusValue::Int(n as i64)
                }
            }
        )*
    };
}

impl_int_status_value!(u8, u16, u32, i8, i16, i32, i64);

impl From<u64> for StatusValue<'_> {
    fn from(n: u64) -> Self {
        StatusValue::Int(n.min(i64::MAX as u64) as i64)
    }
}

impl<'a> From<&'a str> for StatusValue<'a> {
    fn from(s: &'a str) -> Self {
        StatusValue::Text(s)
    }
}

impl From<Timestamp> for StatusValue<'_> {
    fn from(t: Timestamp) -> Self {
        StatusValue::Time(t)
    }
}

/// Blink pattern for a status LED
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashPattern {
    /// Number of blinks
    pub count: u32,
    /// LED on time per blink
    pub on_ms: u32,
    /// LED off time per blink
    pub off_ms: u32,
}

impl FlashPattern {
    /// Nothing was heard
    pub const TIMEOUT: FlashPattern = FlashPattern::new(1, 500, 500);
    /// A packet was heard but rejected
    pub const REJECTED: FlashPattern = FlashPattern::new(3, 100, 100);
    /// Time was committed
    pub const SYNCHRONIZED: FlashPattern = FlashPattern::new(5, 50, 50);

    /// Creates a new blink pattern
    pub const fn new(count: u32, on_ms: u32, off_ms: u32) -> Self {
        FlashPattern {
            count,
            on_ms,
            off_ms,
        }
    }

    /// Total time the pattern takes to play
    pub fn duration_ms(&self) -> u32 {
        self.count.saturating_mul(self.on_ms.saturating_add(self.off_ms))
    }
}

/// Destination for status output
pub trait StatusSink {
    /// Emits one line made of the given values
    fn line(&mut self, values: &[StatusValue<'_>]);

    /// Plays a blink pattern; sinks without an LED ignore it
    fn flash(&mut self, _pattern: FlashPattern) {}
}

/// Joins values with single spaces
pub fn render(values: &[StatusValue<'_>]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Console sink writing through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl StatusSink for TracingSink {
    fn line(&mut self, values: &[StatusValue<'_>]) {
        info!(target: "rftime::status", "{}", render(values));
    }

    fn flash(&mut self, pattern: FlashPattern) {
        info!(
            target: "rftime::status",
            count = pattern.count,
            on_ms = pattern.on_ms,
            off_ms = pattern.off_ms,
            "flash"
        );
    }
}

/// Sink that keeps everything it receives, for inspection
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    /// Rendered lines, oldest first
    pub lines: Vec<String>,
    /// Blink patterns, oldest first
    pub flashes: Vec<FlashPattern>,
}

impl StatusSink for MemorySink {
    fn line(&mut self, values: &[StatusValue<'_>]) {
        self.lines.push(render(values));
    }

    fn flash(&mut self, pattern: FlashPattern) {
        self.flashes.push(pattern);
    }
}

/// Sink that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl StatusSink for NullSink {
    fn line(&mut self, _values: &[StatusValue<'_>]) {}
}

/// Status output that can be switched off at runtime
#[derive(Debug, Clone)]
pub struct StatusReporter<S> {
    sink: S,
    enabled: bool,
}

impl<S: StatusSink> StatusReporter<S> {
    /// Creates a new reporter
    pub fn new(sink: S, enabled: bool) -> Self {
        StatusReporter { sink, enabled }
    }

    /// Whether output is emitted
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Turns output on or off
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Emits one line, if enabled
    pub fn line(&mut self, values: &[StatusValue<'_>]) {
        if self.enabled {
            self.sink.line(values);
        }
    }

    /// Plays a blink pattern, if enabled
    pub fn flash(&mut self, pattern: FlashPattern) {
        if self.enabled {
            self.sink.flash(pattern);
        }
    }

    /// Returns the sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Gives back the sink
    pub fn into_sink(self) -> S {
        self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_mixed_values() {
        let ts = Timestamp(1_595_586_600);
        let line = render(&["synced".into(), 42u32.into(), ts.into(), (-3i32).into()]);
        assert_eq!(line, "synced 42 2020-07-24 10:30:00 -3");
    }

    #[test]
    fn test_u64_saturates() {
        assert_eq!(StatusValue::from(u64::MAX), StatusValue::Int(i64::MAX));
    }

    #[test]
    fn test_disabled_reporter_is_silent() {
        let mut reporter = StatusReporter::new(MemorySink::default(), false);
        reporter.line(&["hidden".into()]);
        reporter.flash(FlashPattern::TIMEOUT);
        assert!(reporter.sink().lines.is_empty());
        assert!(reporter.sink().flashes.is_empty());

        reporter.set_enabled(true);
        reporter.line(&["shown".into()]);
        reporter.flash(FlashPattern::REJECTED);
        assert_eq!(reporter.sink().lines, vec!["shown".to_string()]);
        assert_eq!(reporter.sink().flashes, vec![FlashPattern::REJECTED]);
    }

    #[test]
    fn test_flash_duration() {
        assert_eq!(FlashPattern::TIMEOUT.duration_ms(), 1000);
        assert_eq!(FlashPattern::REJECTED.duration_ms(), 600);
    }
}
