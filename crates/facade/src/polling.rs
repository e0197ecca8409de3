use std::time::Duration;

/// How long, and how often, to poll a queued operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Polling stops once this much time has passed since the first poll.
    pub max_wait: Duration,
    /// Delay between consecutive polls.
    pub interval: Duration,
}

impl PollPolicy {
    pub fn new(max_wait: Duration, interval: Duration) -> Self {
        Self { max_wait, interval }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_wait: Duration::from_secs(30),
            interval: Duration::from_secs(10),
        }
    }
}
