//! Humanized pacing.
//!
//! Interactive lists throttle or reorder under machine-gun input, so the
//! loop pauses a random interval before and after each action. Tests set
//! the ranges to zero.

use std::time::Duration;

use rand::Rng;

/// An inclusive-min, exclusive-max pause range sampled per use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PauseRange {
    pub min: Duration,
    pub max: Duration,
}

impl PauseRange {
    pub const ZERO: Self = Self {
        min: Duration::ZERO,
        max: Duration::ZERO,
    };

    pub fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    pub fn from_millis(min: u64, max: u64) -> Self {
        Self::new(Duration::from_millis(min), Duration::from_millis(max))
    }

    pub fn is_zero(&self) -> bool {
        self.min.is_zero() && self.max.is_zero()
    }

    /// Sample a pause. A degenerate range (max <= min, or narrower than
    /// the millisecond granularity) yields `min`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        let span_ms = (self.max - self.min).as_millis() as u64;
        if span_ms == 0 {
            return self.min;
        }
        self.min + Duration::from_millis(rng.gen_range(0..span_ms))
    }

    /// Sample and sleep. Skips the timer entirely for a zero range.
    pub async fn wait<R: Rng + ?Sized>(&self, rng: &mut R) {
        let pause = self.sample(rng);
        if !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }
    }
}
