//! Polling cadence and give-up policy.
//!
//! Two tolerances that must not be conflated: a small consecutive-miss
//! budget for the write-then-read lag window right after submission, and
//! a hard ceiling on total ticks protecting the caller from a backend
//! that is alive but stuck. Polling runs at a constant cadence -- the
//! operations finish in seconds to low minutes, and a fixed interval
//! keeps timing predictable under test.

use std::time::Duration;

use crate::error::CoreError;

/// Default delay before the first status query. The backend needs time
/// to make the job record queryable after the creation call returns.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(2);
/// Default interval between status queries.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
/// Default number of consecutive lookup misses tolerated before giving up.
pub const DEFAULT_MISS_THRESHOLD: u32 = 3;
/// Default ceiling on total status queries before timing out.
pub const DEFAULT_MAX_TICKS: u32 = 60;

/// Tunable parameters for one operation's poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay between a successful submission and the first status query.
    pub initial_delay: Duration,
    /// Fixed interval between status queries.
    pub poll_interval: Duration,
    /// Consecutive misses (404 or transport error) tolerated before the
    /// job is considered never created. Resets on any successful poll.
    pub miss_threshold: u32,
    /// Hard ceiling on total status queries before timing out.
    pub max_ticks: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_delay: DEFAULT_INITIAL_DELAY,
            poll_interval: DEFAULT_POLL_INTERVAL,
            miss_threshold: DEFAULT_MISS_THRESHOLD,
            max_ticks: DEFAULT_MAX_TICKS,
        }
    }
}

impl PollPolicy {
    /// Validate that the policy's parameters are usable.
    ///
    /// A zero interval would busy-poll the status endpoint; a zero miss
    /// threshold or tick budget would fail every job on its first tick.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.poll_interval.is_zero() {
            return Err(CoreError::InvalidPolicy(
                "poll_interval must be non-zero".into(),
            ));
        }
        if self.miss_threshold == 0 {
            return Err(CoreError::InvalidPolicy(
                "miss_threshold must be at least 1".into(),
            ));
        }
        if self.max_ticks == 0 {
            return Err(CoreError::InvalidPolicy(
                "max_ticks must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
