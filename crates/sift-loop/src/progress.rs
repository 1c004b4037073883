//! Progress detection: did a scroll step actually get us anywhere?
//!
//! Two independent signals: geometric classification of a scroll step
//! (did the position move or the content grow, judged after the settle
//! pause), and a content wait (did an identity outside the known set
//! appear). Geometric progress alone resets the session's idle streak;
//! when the geometry shows nothing, the content wait gives slow loads
//! time to surface new items before the step counts as idle.

use sift_view::view::ScrollFrame;

use crate::director::ScrollDirection;
use crate::error::SessionError;
use crate::poll::PollSchedule;
use crate::registry::IdentityRegistry;
use crate::source::ItemSource;

/// Position/extent deltas below this are treated as noise, matching the
/// sub-pixel jitter a live scroll container reports.
pub const SCROLL_NOISE_THRESHOLD: f64 = 2.0;

/// Classify one scroll step from its before/after geometry.
///
/// Forward (toward the appending end) counts either position movement or
/// content growth as progress: near the edge, new content can load without
/// the position changing. Backward counts movement only — content at the
/// already-seen end does not grow, so extent changes there say nothing
/// about this step.
pub fn classify(before: ScrollFrame, after: ScrollFrame, direction: ScrollDirection) -> bool {
    let moved = (after.position - before.position).abs() >= SCROLL_NOISE_THRESHOLD;
    let grew = (after.content_extent - before.content_extent).abs() >= SCROLL_NOISE_THRESHOLD;
    match direction {
        ScrollDirection::Forward => moved || grew,
        ScrollDirection::Backward => moved,
    }
}

/// Poll the listing until an identity outside the registry appears, or the
/// schedule's deadline passes. Confirms that a scroll step surfaced new
/// items independent of geometric movement.
pub async fn wait_for_new_content(
    source: &ItemSource,
    registry: &IdentityRegistry,
    schedule: PollSchedule,
) -> Result<bool, SessionError> {
    let mut ticks = schedule.ticks();
    while ticks.next().await {
        for item in source.list_visible().await? {
            if !registry.has(&item.identity) {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::{classify, SCROLL_NOISE_THRESHOLD};
    use crate::director::ScrollDirection;
    use sift_view::view::ScrollFrame;

    fn frame(position: f64, content: f64) -> ScrollFrame {
        ScrollFrame {
            position,
            viewport_extent: 600.0,
            content_extent: content,
        }
    }

    #[test]
    fn movement_counts_in_both_directions() {
        let before = frame(100.0, 2000.0);
        let after = frame(400.0, 2000.0);
        assert!(classify(before, after, ScrollDirection::Forward));
        assert!(classify(before, after, ScrollDirection::Backward));
    }

    #[test]
    fn growth_only_counts_when_scrolling_forward() {
        let before = frame(1400.0, 2000.0);
        let after = frame(1400.0, 2600.0);
        assert!(classify(before, after, ScrollDirection::Forward));
        assert!(!classify(before, after, ScrollDirection::Backward));
    }

    #[test]
    fn sub_threshold_jitter_is_not_progress() {
        let before = frame(100.0, 2000.0);
        let after = frame(
            100.0 + SCROLL_NOISE_THRESHOLD / 2.0,
            2000.0 + SCROLL_NOISE_THRESHOLD / 2.0,
        );
        assert!(!classify(before, after, ScrollDirection::Forward));
        assert!(!classify(before, after, ScrollDirection::Backward));
    }
}
