use crate::time::Timestamp;

/// Result of one poll/decode attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// A valid packet was decoded and committed
    Synchronized(Timestamp),
    /// A packet arrived but was not accepted
    Rejected,
    /// Nothing arrived within the poll window
    Timeout,
}

impl AttemptOutcome {
    /// Whether the attempt ended the sync loop
    pub fn is_success(&self) -> bool {
        matches!(self, AttemptOutcome::Synchronized(_))
    }
}

/// Process-local record of sync attempts; never persisted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStatus {
    last_sync: Option<Timestamp>,
    last_outcome: Option<AttemptOutcome>,
    consecutive_failures: u32,
    attempts: u64,
    timeouts: u64,
    rejections: u64,
}

impl SyncStatus {
    /// Creates an empty status
    pub fn new() -> Self {
        SyncStatus::default()
    }

    /// Records the outcome of one attempt
    pub fn record(&mut self, outcome: AttemptOutcome) {
        self.attempts += 1;
        match outcome {
            AttemptOutcome::Synchronized(timestamp) => {
                self.last_sync = Some(timestamp);
                self.consecutive_failures = 0;
            }
            AttemptOutcome::Rejected => {
                self.rejections += 1;
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
            }
            AttemptOutcome::Timeout => {
                self.timeouts += 1;
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
            }
        }
        self.last_outcome = Some(outcome);
    }

    /// Time committed by the last successful sync
    pub fn last_sync(&self) -> Option<Timestamp> {
        self.last_sync
    }

    /// Outcome of the most recent attempt
    pub fn last_outcome(&self) -> Option<AttemptOutcome> {
        self.last_outcome
    }

    /// Failed attempts since the last success
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Total attempts
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// Total timeouts
    pub fn timeouts(&self) -> u64 {
        self.timeouts
    }

    /// Total rejected packets
    pub fn rejections(&self) -> u64 {
        self.rejections
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_counts() {
        let mut status = SyncStatus::new();
        status.record(AttemptOutcome::Timeout);
        status.record(AttemptOutcome::Rejected);
        status.record(AttemptOutcome::Timeout);

        assert_eq!(status.attempts(), 3);
        assert_eq!(status.timeouts(), 2);
        assert_eq!(status.rejections(), 1);
        assert_eq!(status.consecutive_failures(), 3);
        assert_eq!(status.last_outcome(), Some(AttemptOutcome::Timeout));
        assert_eq!(status.last_sync(), None);
    }

    #[test]
    fn test_success_resets_failures() {
        let mut status = SyncStatus::new();
        status.record(AttemptOutcome::Timeout);
        status.record(AttemptOutcome::Synchronized(Timestamp(10)));

        assert_eq!(status.consecutive_failures(), 0);
        assert_eq!(status.last_sync(), Some(Timestamp(10)));
        assert!(status.last_outcome().unwrap().is_success());
    }
}
