//! Re-entrant session control surface.
//!
//! The caller-facing toggle pattern: one invocation starts a session in the
//! background, a second invocation while it is active stops it (tearing
//! down the overlay) instead of starting another. Stopping is cooperative —
//! the session halts between actuations, so a toggle in flight still
//! resolves before the session ends.

use std::sync::Arc;

use rand::RngCore;
use sift_view::overlay::SelectionOverlay;
use sift_view::view::ItemView;
use tokio_util::sync::CancellationToken;

use crate::error::SessionError;
use crate::event::{NullEventSink, SessionEventSink};
use crate::session::{SessionConfig, SessionController, SessionReport};

/// A running session owned by the caller. Dropping the handle without
/// stopping leaves the background task running to its own terminal state.
pub struct SessionHandle {
    cancel: CancellationToken,
    task: tokio::task::JoinHandle<Result<SessionReport, SessionError>>,
}

impl SessionHandle {
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Request a stop and wait for the session's final report.
    pub async fn stop(self) -> Result<SessionReport, SessionError> {
        self.cancel.cancel();
        self.join().await
    }

    /// Wait for the session to reach a terminal state on its own.
    pub async fn join(self) -> Result<SessionReport, SessionError> {
        match self.task.await {
            Ok(result) => result,
            Err(join_err) => Err(SessionError::View {
                message: format!("session task failed: {join_err}"),
            }),
        }
    }
}

/// What a toggle invocation did.
#[derive(Debug)]
pub enum ToggleAction {
    Started,
    /// An active session was stopped; its final report is attached.
    Stopped(SessionReport),
}

/// Builds sessions and multiplexes the toggle-on/toggle-off pattern over
/// one view.
pub struct SessionRunner {
    view: Arc<dyn ItemView>,
    overlay: Option<Arc<dyn SelectionOverlay>>,
    sink: Arc<dyn SessionEventSink>,
    config: SessionConfig,
    seed_rng: Option<fn() -> Box<dyn RngCore + Send>>,
    active: Option<SessionHandle>,
    last_report: Option<SessionReport>,
}

impl SessionRunner {
    pub fn new(view: Arc<dyn ItemView>, config: SessionConfig) -> Self {
        Self {
            view,
            overlay: None,
            sink: Arc::new(NullEventSink),
            config,
            seed_rng: None,
            active: None,
            last_report: None,
        }
    }

    pub fn with_overlay(mut self, overlay: Arc<dyn SelectionOverlay>) -> Self {
        self.overlay = Some(overlay);
        self
    }

    pub fn with_event_sink(mut self, sink: Arc<dyn SessionEventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Use a custom entropy source factory for every started session
    /// (deterministic tests).
    pub fn with_rng_factory(mut self, factory: fn() -> Box<dyn RngCore + Send>) -> Self {
        self.seed_rng = Some(factory);
        self
    }

    /// The report of the most recently completed session, if any.
    pub fn last_report(&self) -> Option<&SessionReport> {
        self.last_report.as_ref()
    }

    /// Toggle: start a session if none is active, stop the active one
    /// otherwise. A session that already reached a terminal state on its
    /// own counts as inactive — its report is collected and a fresh
    /// session starts.
    pub async fn toggle(&mut self) -> Result<ToggleAction, SessionError> {
        if let Some(handle) = self.active.take() {
            if handle.is_finished() {
                self.last_report = Some(handle.join().await?);
            } else {
                let report = handle.stop().await?;
                self.last_report = Some(report.clone());
                return Ok(ToggleAction::Stopped(report));
            }
        }

        let cancel = CancellationToken::new();
        let mut controller = SessionController::new(self.view.clone(), self.config.clone())
            .with_event_sink(self.sink.clone());
        if let Some(overlay) = &self.overlay {
            controller = controller.with_overlay(overlay.clone());
        }
        if let Some(factory) = self.seed_rng {
            controller = controller.with_rng(factory());
        }

        let session_cancel = cancel.clone();
        let task = tokio::spawn(async move { controller.run(session_cancel).await });
        self.active = Some(SessionHandle { cancel, task });
        Ok(ToggleAction::Started)
    }

    /// Wait for the active session (if any) to finish on its own.
    pub async fn join_active(&mut self) -> Result<Option<SessionReport>, SessionError> {
        match self.active.take() {
            Some(handle) => {
                let report = handle.join().await?;
                self.last_report = Some(report.clone());
                Ok(Some(report))
            }
            None => Ok(None),
        }
    }
}
