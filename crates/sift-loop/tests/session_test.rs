#![allow(clippy::expect_used, clippy::unwrap_used)]

//! End-to-end session tests over the simulated view.
//!
//! Pacing is stripped and the poll schedules shortened so each scenario
//! runs in milliseconds of wall-clock time.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use sift_loop::director::{DirectionMode, ScrollDirection, StartPosition};
use sift_loop::error::SessionError;
use sift_loop::event::{InMemoryEventSink, SessionEventKind};
use sift_loop::session::{SessionConfig, SessionController, SessionStatus};
use sift_view::overlay::RecordingOverlay;
use sift_view::simulated::{SimulatedItem, SimulatedView};
use sift_view::view::ItemHandle;
use tokio_util::sync::CancellationToken;

fn quick_config() -> SessionConfig {
    let mut config = SessionConfig::default().without_pacing();
    config.confirm_timeout = Duration::from_millis(200);
    config.confirm_interval = Duration::from_millis(10);
    config.content_wait_timeout = Duration::from_millis(300);
    config.content_wait_interval = Duration::from_millis(10);
    config
}

fn seeded_rng() -> Box<dyn rand::RngCore + Send> {
    Box::new(StdRng::seed_from_u64(7))
}

#[tokio::test]
async fn reaches_the_target_across_two_pages() {
    // Five undecided items split across two viewport-sized pages.
    let view = Arc::new(
        SimulatedView::new(600.0, 1200.0)
            .with_item(SimulatedItem::unselected("a", 50.0))
            .with_item(SimulatedItem::unselected("b", 120.0))
            .with_item(SimulatedItem::unselected("c", 200.0))
            .with_item(SimulatedItem::unselected("d", 700.0))
            .with_item(SimulatedItem::unselected("e", 800.0)),
    );
    let mut config = quick_config();
    config.target = Some(5);

    let mut controller =
        SessionController::new(view.clone(), config).with_rng(seeded_rng());
    let report = controller.run(CancellationToken::new()).await.unwrap();

    assert_eq!(report.status, SessionStatus::Satisfied);
    assert_eq!(report.achieved, 5);
    assert_eq!(report.processed, 5);
    // One toggle per item, never more.
    assert_eq!(view.toggle_calls().len(), 5);
}

#[tokio::test]
async fn stops_scanning_once_the_target_is_met() {
    let view = Arc::new(
        SimulatedView::new(600.0, 600.0)
            .with_item(SimulatedItem::unselected("a", 10.0))
            .with_item(SimulatedItem::unselected("b", 20.0))
            .with_item(SimulatedItem::unselected("c", 30.0))
            .with_item(SimulatedItem::unselected("d", 40.0)),
    );
    let mut config = quick_config();
    config.target = Some(2);

    let mut controller =
        SessionController::new(view.clone(), config).with_rng(seeded_rng());
    let report = controller.run(CancellationToken::new()).await.unwrap();

    assert_eq!(report.status, SessionStatus::Satisfied);
    assert_eq!(report.achieved, 2);
    assert_eq!(view.toggle_calls().len(), 2);
}

#[tokio::test]
async fn only_unselected_items_are_toggled() {
    let view = Arc::new(
        SimulatedView::new(600.0, 600.0)
            .with_item(SimulatedItem::selected("done", 10.0))
            .with_item(SimulatedItem::unselected("fresh", 20.0))
            .with_item(SimulatedItem::indeterminate("odd", 30.0))
            .with_item(SimulatedItem::unselected("fresh2", 40.0)),
    );
    let mut config = quick_config();
    config.max_idle_streaks = 1;

    let mut controller =
        SessionController::new(view.clone(), config).with_rng(seeded_rng());
    let report = controller.run(CancellationToken::new()).await.unwrap();

    assert_eq!(report.status, SessionStatus::Exhausted);
    assert_eq!(report.achieved, 2);
    // Selected and indeterminate items are decided without actuation.
    assert_eq!(report.processed, 4);
    let calls = view.toggle_calls();
    assert_eq!(calls.len(), 2);
    assert!(!calls.contains(&0));
    assert!(!calls.contains(&2));
}

#[tokio::test]
async fn rescans_never_revisit_a_decided_identity() {
    let view = Arc::new(
        SimulatedView::new(600.0, 600.0)
            .with_item(SimulatedItem::unselected("only", 10.0)),
    );
    let mut config = quick_config();
    config.max_idle_streaks = 3;

    let mut controller =
        SessionController::new(view.clone(), config).with_rng(seeded_rng());
    let report = controller.run(CancellationToken::new()).await.unwrap();

    // Three idle rescans of the same page must not re-toggle the item.
    assert_eq!(report.status, SessionStatus::Exhausted);
    assert_eq!(view.toggle_count(ItemHandle(0)), 1);
}

#[tokio::test]
async fn gives_up_after_exactly_the_configured_idle_streaks() {
    let view = Arc::new(
        SimulatedView::new(600.0, 2000.0)
            .with_item(SimulatedItem::unselected("pinned", 10.0))
            .with_frozen_scroll(),
    );
    let sink = Arc::new(InMemoryEventSink::new());
    let mut config = quick_config();
    config.max_idle_streaks = 3;

    let mut controller = SessionController::new(view, config)
        .with_event_sink(sink.clone())
        .with_rng(seeded_rng());
    let report = controller.run(CancellationToken::new()).await.unwrap();

    assert_eq!(report.status, SessionStatus::Exhausted);
    let streaks: Vec<u32> = sink
        .kinds()
        .into_iter()
        .filter_map(|kind| match kind {
            SessionEventKind::IdleStep { streak } => Some(streak),
            _ => None,
        })
        .collect();
    assert_eq!(streaks, vec![1, 2, 3]);
}

#[tokio::test]
async fn adaptive_mode_flips_direction_and_recovers_items_behind() {
    // Starting at the bottom leaves one item behind; the flip goes back
    // for it.
    let view = Arc::new(
        SimulatedView::new(600.0, 1200.0)
            .with_item(SimulatedItem::unselected("early", 100.0))
            .with_item(SimulatedItem::unselected("late", 700.0)),
    );
    let sink = Arc::new(InMemoryEventSink::new());
    let mut config = quick_config();
    config.target = Some(2);
    config.mode = DirectionMode::Adaptive;
    config.start_position = StartPosition::Bottom;
    config.max_idle_streaks = 2;

    let mut controller = SessionController::new(view.clone(), config)
        .with_event_sink(sink.clone())
        .with_rng(seeded_rng());
    let report = controller.run(CancellationToken::new()).await.unwrap();

    assert_eq!(report.status, SessionStatus::Satisfied);
    assert_eq!(report.achieved, 2);
    assert!(sink.kinds().contains(&SessionEventKind::DirectionFlipped {
        direction: ScrollDirection::Backward
    }));
}

#[tokio::test]
async fn forward_edge_growth_counts_as_progress() {
    // The first scroll cannot move (one page loaded) but grows the
    // content; growth alone keeps the streak at zero.
    let view = Arc::new(
        SimulatedView::lazy(600.0, 600.0, 1200.0, 600.0)
            .with_item(SimulatedItem::unselected("first", 50.0))
            .with_item(SimulatedItem::unselected("second", 700.0)),
    );
    let sink = Arc::new(InMemoryEventSink::new());
    let mut config = quick_config();
    config.target = Some(2);

    let mut controller = SessionController::new(view, config)
        .with_event_sink(sink.clone())
        .with_rng(seeded_rng());
    let report = controller.run(CancellationToken::new()).await.unwrap();

    assert_eq!(report.status, SessionStatus::Satisfied);
    assert_eq!(report.achieved, 2);
    assert!(!sink
        .kinds()
        .iter()
        .any(|kind| matches!(kind, SessionEventKind::IdleStep { .. })));
}

#[tokio::test]
async fn slow_content_growth_is_waited_for() {
    // Growth lands well after the scroll request. The step classifies as
    // no-progress, but the content wait must still pick up the late item
    // instead of counting idle steps toward exhaustion.
    let view = Arc::new(
        SimulatedView::lazy(600.0, 350.0, 1200.0, 850.0)
            .with_growth_delay(Duration::from_millis(100))
            .with_item(SimulatedItem::unselected("first", 50.0))
            .with_item(SimulatedItem::unselected("late", 400.0)),
    );
    let sink = Arc::new(InMemoryEventSink::new());
    let mut config = quick_config();
    config.target = Some(2);
    config.content_wait_timeout = Duration::from_millis(500);

    let mut controller = SessionController::new(view, config)
        .with_event_sink(sink.clone())
        .with_rng(seeded_rng());
    let report = controller.run(CancellationToken::new()).await.unwrap();

    assert_eq!(report.status, SessionStatus::Satisfied);
    assert_eq!(report.achieved, 2);
    assert!(!sink
        .kinds()
        .iter()
        .any(|kind| matches!(kind, SessionEventKind::IdleStep { .. })));
}

#[tokio::test]
async fn overlay_is_applied_then_cleared() {
    let view = Arc::new(
        SimulatedView::new(600.0, 600.0)
            .with_item(SimulatedItem::unselected("a", 10.0)),
    );
    let overlay = Arc::new(RecordingOverlay::new());
    let mut config = quick_config();
    config.max_idle_streaks = 1;

    let mut controller = SessionController::new(view, config)
        .with_overlay(overlay.clone())
        .with_rng(seeded_rng());
    controller.run(CancellationToken::new()).await.unwrap();

    assert!(!overlay.is_applied());
    assert_eq!(overlay.snapshot(), vec![true, false]);
}

#[tokio::test]
async fn overlay_is_cleared_on_stop() {
    let view = Arc::new(SimulatedView::new(600.0, 600.0));
    let overlay = Arc::new(RecordingOverlay::new());
    let stop = CancellationToken::new();
    stop.cancel();

    let mut controller = SessionController::new(view, quick_config())
        .with_overlay(overlay.clone())
        .with_rng(seeded_rng());
    let report = controller.run(stop).await.unwrap();

    assert_eq!(report.status, SessionStatus::Stopped);
    assert_eq!(report.achieved, 0);
    assert_eq!(overlay.snapshot(), vec![true, false]);
}

#[tokio::test]
async fn recording_keeps_labels_only() {
    let view = Arc::new(
        SimulatedView::new(600.0, 600.0)
            .with_item(SimulatedItem::unselected("named", 10.0))
            .with_item(SimulatedItem::unlabeled(20.0, 4.0)),
    );
    let mut config = quick_config();
    config.target = Some(2);
    config.record_selections = true;

    let mut controller =
        SessionController::new(view, config).with_rng(seeded_rng());
    let report = controller.run(CancellationToken::new()).await.unwrap();

    assert_eq!(report.achieved, 2);
    // Geometry-derived identities are positional and not worth keeping.
    assert_eq!(report.recorded_labels, vec!["named".to_string()]);
}

#[tokio::test]
async fn missing_container_fails_before_anything_runs() {
    let view = Arc::new(
        SimulatedView::new(600.0, 600.0)
            .with_item(SimulatedItem::unselected("a", 10.0))
            .without_container(),
    );
    let overlay = Arc::new(RecordingOverlay::new());

    let mut controller = SessionController::new(view.clone(), quick_config())
        .with_overlay(overlay.clone())
        .with_rng(seeded_rng());
    let result = controller.run(CancellationToken::new()).await;

    assert!(matches!(
        result,
        Err(SessionError::ViewUnavailable { .. })
    ));
    assert!(view.toggle_calls().is_empty());
    assert!(overlay.snapshot().is_empty());
}

#[tokio::test]
async fn selection_events_carry_a_monotonic_count() {
    let view = Arc::new(
        SimulatedView::new(600.0, 600.0)
            .with_item(SimulatedItem::unselected("a", 10.0))
            .with_item(SimulatedItem::unselected("b", 20.0))
            .with_item(SimulatedItem::unselected("c", 30.0)),
    );
    let sink = Arc::new(InMemoryEventSink::new());
    let mut config = quick_config();
    config.target = Some(3);

    let mut controller = SessionController::new(view, config)
        .with_event_sink(sink.clone())
        .with_rng(seeded_rng());
    controller.run(CancellationToken::new()).await.unwrap();

    let counts: Vec<u32> = sink
        .kinds()
        .into_iter()
        .filter_map(|kind| match kind {
            SessionEventKind::ItemSelected { achieved, .. } => Some(achieved),
            _ => None,
        })
        .collect();
    assert_eq!(counts, vec![1, 2, 3]);
}

#[tokio::test]
async fn unconfirmed_items_are_skipped_not_retried() {
    let view = Arc::new(
        SimulatedView::new(600.0, 600.0)
            .with_item(SimulatedItem::unselected("stuck", 10.0).never_confirming())
            .with_item(SimulatedItem::unselected("fine", 20.0)),
    );
    let sink = Arc::new(InMemoryEventSink::new());
    let mut config = quick_config();
    config.max_idle_streaks = 2;

    let mut controller = SessionController::new(view.clone(), config)
        .with_event_sink(sink.clone())
        .with_rng(seeded_rng());
    let report = controller.run(CancellationToken::new()).await.unwrap();

    assert_eq!(report.achieved, 1);
    assert_eq!(report.processed, 2);
    // The stuck item got its single toggle and no more, across every
    // rescan.
    assert_eq!(view.toggle_count(ItemHandle(0)), 1);
    assert!(sink.kinds().iter().any(|kind| matches!(
        kind,
        SessionEventKind::ItemSkipped { identity, .. } if identity == "stuck"
    )));
}

#[tokio::test]
async fn lifecycle_events_bracket_the_run() {
    let view =
        Arc::new(SimulatedView::new(600.0, 600.0).with_item(SimulatedItem::unselected("a", 10.0)));
    let sink = Arc::new(InMemoryEventSink::new());
    let mut config = quick_config();
    config.target = Some(1);

    let mut controller = SessionController::new(view, config)
        .with_event_sink(sink.clone())
        .with_rng(seeded_rng());
    controller.run(CancellationToken::new()).await.unwrap();

    let kinds = sink.kinds();
    assert!(matches!(
        kinds.first(),
        Some(SessionEventKind::Started {
            target: Some(1),
            ..
        })
    ));
    assert!(matches!(
        kinds.last(),
        Some(SessionEventKind::Finished {
            status: SessionStatus::Satisfied,
            achieved: 1,
            processed: 1,
        })
    ));
}
