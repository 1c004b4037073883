//! Session controller: the discovery–select–confirm–scroll state machine.
//!
//! One cooperative task drives the whole loop: scan the rendered items,
//! actuate the undecided ones through the actuator, scroll, wait for new
//! content, repeat. Terminal outcomes are `Satisfied` (target met),
//! `Exhausted` (too many consecutive no-progress steps), or `Stopped`
//! (external cancellation between actuations). None of them is an error.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use sift_view::overlay::SelectionOverlay;
use sift_view::view::{ItemState, ItemView};
use tokio_util::sync::CancellationToken;

use crate::actuator::{ActuatorConfig, SelectionActuator, ToggleReason};
use crate::director::{
    DirectionMode, ScrollDirection, ScrollDirector, StartPosition, StepFactorRange,
};
use crate::error::SessionError;
use crate::event::{NullEventSink, SessionEvent, SessionEventKind, SessionEventSink};
use crate::pace::PauseRange;
use crate::poll::PollSchedule;
use crate::progress::{classify, wait_for_new_content};
use crate::registry::IdentityRegistry;
use crate::source::ItemSource;

/// Loop phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Iterating the currently listed items.
    Scanning,
    /// Advancing the view.
    Scrolling,
    /// Confirming that new content appeared.
    Waiting,
    /// Terminal: target reached.
    Satisfied,
    /// Terminal: idle streak exceeded the configured maximum.
    Exhausted,
}

impl SessionPhase {
    pub fn terminal_status(self) -> Option<SessionStatus> {
        match self {
            Self::Satisfied => Some(SessionStatus::Satisfied),
            Self::Exhausted => Some(SessionStatus::Exhausted),
            _ => None,
        }
    }
}

/// What a phase observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseEvent {
    TargetReached,
    ScanExhausted,
    ScrollIssued,
    NewContent,
    NoProgress,
    StreakExhausted,
}

/// Pure transition function for the loop phases.
pub fn next_phase(_current: SessionPhase, event: PhaseEvent) -> SessionPhase {
    match event {
        PhaseEvent::TargetReached => SessionPhase::Satisfied,
        PhaseEvent::ScanExhausted => SessionPhase::Scrolling,
        PhaseEvent::ScrollIssued => SessionPhase::Waiting,
        PhaseEvent::NewContent | PhaseEvent::NoProgress => SessionPhase::Scanning,
        PhaseEvent::StreakExhausted => SessionPhase::Exhausted,
    }
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionStatus {
    /// The target count was reached.
    Satisfied,
    /// The list stopped yielding new content.
    Exhausted,
    /// The caller stopped the session.
    Stopped,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Satisfied => "satisfied",
            Self::Exhausted => "exhausted",
            Self::Stopped => "stopped",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a session needs to decide when to act, wait, and give up.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Confirmed selections to aim for; `None` runs until exhausted or
    /// stopped.
    pub target: Option<u32>,
    pub mode: DirectionMode,
    pub start_position: StartPosition,
    /// Consecutive no-progress scroll steps before the session gives up.
    pub max_idle_streaks: u32,
    pub confirm_timeout: Duration,
    pub confirm_interval: Duration,
    pub content_wait_timeout: Duration,
    pub content_wait_interval: Duration,
    pub pre_toggle_pause: PauseRange,
    pub between_items_pause: PauseRange,
    pub after_scroll_pause: PauseRange,
    /// Settle time between jump-to-end attempts when starting at the
    /// bottom.
    pub start_settle: Duration,
    pub step_factors: StepFactorRange,
    /// Decimal places kept in the geometry-fallback identity.
    pub fallback_precision: usize,
    /// Accumulate the labels of confirmed selections in the report.
    pub record_selections: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            target: None,
            mode: DirectionMode::Forward,
            start_position: StartPosition::Keep,
            max_idle_streaks: 10,
            confirm_timeout: Duration::from_secs(5),
            confirm_interval: Duration::from_millis(150),
            content_wait_timeout: Duration::from_secs(10),
            content_wait_interval: Duration::from_millis(300),
            pre_toggle_pause: PauseRange::from_millis(180, 450),
            between_items_pause: PauseRange::from_millis(120, 300),
            after_scroll_pause: PauseRange::from_millis(1700, 3200),
            start_settle: Duration::from_millis(1500),
            step_factors: StepFactorRange::default(),
            fallback_precision: 1,
            record_selections: false,
        }
    }
}

impl SessionConfig {
    /// Strip all humanized pauses. Intended for tests and simulations
    /// where wall-clock pacing is noise.
    pub fn without_pacing(mut self) -> Self {
        self.pre_toggle_pause = PauseRange::ZERO;
        self.between_items_pause = PauseRange::ZERO;
        self.after_scroll_pause = PauseRange::ZERO;
        self.start_settle = Duration::ZERO;
        self
    }
}

/// Final accounting for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub status: SessionStatus,
    /// Confirmed selections.
    pub achieved: u32,
    /// Identities decided on (selected, skipped, or already done).
    pub processed: usize,
    /// Labels of confirmed selections, in order, when recording is on.
    pub recorded_labels: Vec<String>,
}

struct SessionState {
    registry: IdentityRegistry,
    achieved: u32,
    idle_streak: u32,
    direction: ScrollDirection,
    recorded_labels: Vec<String>,
    // Geometric classification of the most recent scroll step.
    last_step_progressed: bool,
}

impl SessionState {
    fn new(direction: ScrollDirection) -> Self {
        Self {
            registry: IdentityRegistry::new(),
            achieved: 0,
            idle_streak: 0,
            direction,
            recorded_labels: Vec::new(),
            last_step_progressed: true,
        }
    }

    fn target_met(&self, target: Option<u32>) -> bool {
        matches!(target, Some(target) if self.achieved >= target)
    }
}

/// Drives one selection session over a view.
pub struct SessionController {
    view: Arc<dyn ItemView>,
    overlay: Option<Arc<dyn SelectionOverlay>>,
    sink: Arc<dyn SessionEventSink>,
    config: SessionConfig,
    rng: Box<dyn RngCore + Send>,
}

impl SessionController {
    pub fn new(view: Arc<dyn ItemView>, config: SessionConfig) -> Self {
        Self {
            view,
            overlay: None,
            sink: Arc::new(NullEventSink),
            config,
            rng: Box::new(StdRng::from_entropy()),
        }
    }

    /// Hide already-selected items while the session runs. The overlay is
    /// cleared on every exit path.
    pub fn with_overlay(mut self, overlay: Arc<dyn SelectionOverlay>) -> Self {
        self.overlay = Some(overlay);
        self
    }

    pub fn with_event_sink(mut self, sink: Arc<dyn SessionEventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Replace the entropy source (seeded in tests for determinism).
    pub fn with_rng(mut self, rng: Box<dyn RngCore + Send>) -> Self {
        self.rng = rng;
        self
    }

    /// Run the session to a terminal status.
    ///
    /// `stop` is consulted between actuations and between phases only; a
    /// toggle in flight always runs to confirmation or timeout first.
    pub async fn run(&mut self, stop: CancellationToken) -> Result<SessionReport, SessionError> {
        // Fail fast: a session must not start against a view it cannot
        // scroll.
        self.view
            .scroll_frame()
            .await
            .map_err(|err| SessionError::ViewUnavailable {
                message: err.to_string(),
            })?;

        if let Some(overlay) = &self.overlay {
            overlay.apply().await?;
        }
        self.emit(SessionEventKind::Started {
            target: self.config.target,
            mode: self.config.mode,
        });

        let mut state = SessionState::new(self.config.mode.initial_direction());
        let result = self.drive(&stop, &mut state).await;

        if let Some(overlay) = &self.overlay {
            // Teardown is unconditional: stop, exhaustion, and errors all
            // restore the view.
            let _ = overlay.clear().await;
        }

        let status = result?;
        self.emit(SessionEventKind::Finished {
            status,
            achieved: state.achieved,
            processed: state.registry.len(),
        });
        Ok(SessionReport {
            status,
            achieved: state.achieved,
            processed: state.registry.len(),
            recorded_labels: state.recorded_labels,
        })
    }

    async fn drive(
        &mut self,
        stop: &CancellationToken,
        state: &mut SessionState,
    ) -> Result<SessionStatus, SessionError> {
        let source = ItemSource::new(self.view.clone(), self.config.fallback_precision);
        let actuator = SelectionActuator::new(
            self.view.clone(),
            ActuatorConfig {
                confirm_timeout: self.config.confirm_timeout,
                confirm_interval: self.config.confirm_interval,
            },
        );
        let director = ScrollDirector::new(self.view.clone(), self.config.step_factors);
        let content_schedule = PollSchedule::new(
            self.config.content_wait_timeout,
            self.config.content_wait_interval,
        );

        director
            .move_to_start(self.config.start_position, self.config.start_settle)
            .await?;

        let mut phase = SessionPhase::Scanning;
        loop {
            if stop.is_cancelled() {
                return Ok(SessionStatus::Stopped);
            }
            if let Some(status) = phase.terminal_status() {
                return Ok(status);
            }
            phase = match phase {
                SessionPhase::Scanning => {
                    self.scan(stop, state, &source, &actuator).await?;
                    if stop.is_cancelled() {
                        return Ok(SessionStatus::Stopped);
                    }
                    if state.target_met(self.config.target) {
                        next_phase(phase, PhaseEvent::TargetReached)
                    } else {
                        next_phase(phase, PhaseEvent::ScanExhausted)
                    }
                }
                SessionPhase::Scrolling => {
                    let before = self.view.scroll_frame().await?;
                    director.step(state.direction, &mut self.rng).await?;
                    self.emit(SessionEventKind::ScrollStep {
                        direction: state.direction,
                    });
                    // Judge the step only after the settle pause; lazy
                    // loads land after the scroll request, not during it.
                    self.config.after_scroll_pause.wait(&mut self.rng).await;
                    let after = self.view.scroll_frame().await?;
                    state.last_step_progressed = classify(before, after, state.direction);
                    next_phase(phase, PhaseEvent::ScrollIssued)
                }
                SessionPhase::Waiting => {
                    // Geometric progress alone is enough. When the geometry
                    // shows nothing, the content wait still gives slow
                    // loads time to surface an unseen identity before the
                    // step counts as idle.
                    let found = state.last_step_progressed
                        || wait_for_new_content(&source, &state.registry, content_schedule)
                            .await?;
                    if found {
                        state.idle_streak = 0;
                        next_phase(phase, PhaseEvent::NewContent)
                    } else {
                        state.idle_streak += 1;
                        self.emit(SessionEventKind::IdleStep {
                            streak: state.idle_streak,
                        });
                        // Exhaustion is checked before any adaptive flip,
                        // so adaptive recovery needs a threshold of at
                        // least 2.
                        if state.idle_streak >= self.config.max_idle_streaks {
                            next_phase(phase, PhaseEvent::StreakExhausted)
                        } else {
                            if self.config.mode.is_adaptive() {
                                state.direction = state.direction.flipped();
                                self.emit(SessionEventKind::DirectionFlipped {
                                    direction: state.direction,
                                });
                            }
                            next_phase(phase, PhaseEvent::NoProgress)
                        }
                    }
                }
                SessionPhase::Satisfied | SessionPhase::Exhausted => phase,
            };
        }
    }

    /// Process every undecided item in the current listing, stopping early
    /// at the target or on cancellation.
    async fn scan(
        &mut self,
        stop: &CancellationToken,
        state: &mut SessionState,
        source: &ItemSource,
        actuator: &SelectionActuator,
    ) -> Result<(), SessionError> {
        if state.target_met(self.config.target) {
            return Ok(());
        }
        let items = source.list_visible().await?;
        for item in items {
            if stop.is_cancelled() || state.target_met(self.config.target) {
                return Ok(());
            }
            if state.registry.has(&item.identity) {
                continue;
            }
            match item.state {
                ItemState::Selected => {
                    // Already done by someone else; never touch it.
                    state.registry.mark_processed(item.identity);
                }
                ItemState::Indeterminate => {
                    self.emit(SessionEventKind::ItemSkipped {
                        identity: item.identity.key().to_string(),
                        reason: ToggleReason::InvalidInitialState,
                    });
                    state.registry.mark_processed(item.identity);
                }
                ItemState::Unselected => {
                    self.config.pre_toggle_pause.wait(&mut self.rng).await;
                    let toggle_outcome = actuator.select(&item).await?;
                    match toggle_outcome.reason {
                        ToggleReason::Confirmed => {
                            state.achieved += 1;
                            if self.config.record_selections && item.identity.is_label() {
                                let label = item.identity.key().to_string();
                                if !state.recorded_labels.contains(&label) {
                                    state.recorded_labels.push(label);
                                }
                            }
                            self.emit(SessionEventKind::ItemSelected {
                                identity: item.identity.key().to_string(),
                                achieved: state.achieved,
                            });
                        }
                        ToggleReason::AlreadySelected => {}
                        reason => {
                            self.emit(SessionEventKind::ItemSkipped {
                                identity: item.identity.key().to_string(),
                                reason,
                            });
                        }
                    }
                    // Decided either way; this identity is never revisited
                    // in this session.
                    state.registry.mark_processed(item.identity);
                    self.config.between_items_pause.wait(&mut self.rng).await;
                }
            }
        }
        Ok(())
    }

    fn emit(&self, kind: SessionEventKind) {
        self.sink.record(SessionEvent::new(kind));
    }
}
