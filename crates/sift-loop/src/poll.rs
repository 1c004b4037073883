//! Reusable bounded polling.
//!
//! The view offers no change-notification guarantee, so every wait in the
//! loop is an explicit probe-until-deadline: probe immediately, then once
//! per interval until the timeout elapses. This module is the single
//! suspension primitive the actuator and the content wait are built on.

use std::time::Duration;

use tokio::time::Instant;

/// A bounded polling schedule: how long to keep probing and how long to
/// sleep between probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSchedule {
    pub timeout: Duration,
    pub interval: Duration,
}

impl PollSchedule {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    /// Start the schedule now.
    pub fn ticks(&self) -> PollTicks {
        PollTicks {
            deadline: Instant::now() + self.timeout,
            interval: self.interval,
            first: true,
        }
    }
}

/// Iterator-style driver for one polling run.
///
/// ```ignore
/// let mut ticks = schedule.ticks();
/// while ticks.next().await {
///     if probe() { return found; }
/// }
/// // deadline elapsed
/// ```
#[derive(Debug)]
pub struct PollTicks {
    deadline: Instant,
    interval: Duration,
    first: bool,
}

impl PollTicks {
    /// Returns true when the caller should probe again, sleeping one
    /// interval first (never before the first probe). Returns false once
    /// the next probe would land past the deadline.
    pub async fn next(&mut self) -> bool {
        if self.first {
            self.first = false;
            return true;
        }
        if Instant::now() + self.interval > self.deadline {
            return false;
        }
        tokio::time::sleep(self.interval).await;
        true
    }
}
