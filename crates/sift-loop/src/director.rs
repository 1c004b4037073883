//! Scroll direction policy and step execution.
//!
//! Steps are a randomized multiple of the viewport so the interaction looks
//! organic and does not overshoot far past freshly loaded content.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use sift_view::view::ItemView;

use crate::error::SessionError;

/// Which end of the list a step reveals.
///
/// `Forward` is the appending end (the host list loads new content there);
/// `Backward` re-reveals already-loaded content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrollDirection {
    Forward,
    Backward,
}

impl ScrollDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Backward => "backward",
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }
}

impl std::fmt::Display for ScrollDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configured scrolling strategy for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectionMode {
    /// Always scroll forward.
    Forward,
    /// Always scroll backward.
    Backward,
    /// Start forward; flip direction on every no-progress step, so a
    /// direction that has run dry can be abandoned.
    Adaptive,
}

impl DirectionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Backward => "backward",
            Self::Adaptive => "adaptive",
        }
    }

    pub fn initial_direction(self) -> ScrollDirection {
        match self {
            Self::Forward | Self::Adaptive => ScrollDirection::Forward,
            Self::Backward => ScrollDirection::Backward,
        }
    }

    pub fn is_adaptive(self) -> bool {
        matches!(self, Self::Adaptive)
    }
}

impl std::fmt::Display for DirectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where to position the view before the first scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StartPosition {
    /// Leave the view wherever it is.
    Keep,
    Top,
    Bottom,
}

impl StartPosition {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Keep => "keep",
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }
}

/// Randomized step magnitude, as a multiple of the viewport extent.
#[derive(Debug, Clone, Copy)]
pub struct StepFactorRange {
    pub min: f64,
    pub max: f64,
}

impl Default for StepFactorRange {
    fn default() -> Self {
        Self { min: 1.2, max: 1.8 }
    }
}

/// Issues scroll adjustments against the view.
pub struct ScrollDirector {
    view: Arc<dyn ItemView>,
    factors: StepFactorRange,
}

impl ScrollDirector {
    pub fn new(view: Arc<dyn ItemView>, factors: StepFactorRange) -> Self {
        Self { view, factors }
    }

    /// Perform one scroll adjustment in the given direction, clamped to the
    /// content range.
    pub async fn step<R: Rng + ?Sized>(
        &self,
        direction: ScrollDirection,
        rng: &mut R,
    ) -> Result<(), SessionError> {
        let frame = self.view.scroll_frame().await?;
        let factor = if self.factors.max > self.factors.min {
            rng.gen_range(self.factors.min..self.factors.max)
        } else {
            self.factors.min
        };
        let amount = frame.viewport_extent * factor;
        let target = match direction {
            ScrollDirection::Forward => frame.position + amount,
            ScrollDirection::Backward => frame.position - amount,
        };
        self.view.set_scroll_position(frame.clamp(target)).await?;
        Ok(())
    }

    /// Move to the configured start position before the first scan.
    ///
    /// `Bottom` jumps to the end a few times with a settle pause between
    /// attempts — lazy lists grow their extent gradually, so a single jump
    /// rarely lands at the true end.
    pub async fn move_to_start(
        &self,
        start: StartPosition,
        settle: Duration,
    ) -> Result<(), SessionError> {
        match start {
            StartPosition::Keep => Ok(()),
            StartPosition::Top => {
                self.view.set_scroll_position(0.0).await?;
                Ok(())
            }
            StartPosition::Bottom => {
                for attempt in 0..3 {
                    let frame = self.view.scroll_frame().await?;
                    self.view.set_scroll_position(frame.max_position()).await?;
                    if attempt < 2 && !settle.is_zero() {
                        tokio::time::sleep(settle).await;
                    }
                }
                Ok(())
            }
        }
    }
}
