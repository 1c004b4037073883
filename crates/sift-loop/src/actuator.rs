//! Selection actuator: one toggle, confirmed or abandoned, never repeated.
//!
//! An unconfirmed toggle may still have landed; issuing a second toggle to
//! "fix" it would then undo the selection. The actuator therefore issues at
//! most one toggle per call and resolves every call into an outcome —
//! confirm-or-skip, never retry-by-re-toggling.

use std::sync::Arc;
use std::time::Duration;

use sift_view::error::ViewError;
use sift_view::view::{ItemState, ItemView};

use crate::error::SessionError;
use crate::poll::PollSchedule;
use crate::source::{ItemIdentity, ListedItem};

/// Why an actuation call resolved the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToggleReason {
    /// The toggle was issued and the selected state was observed.
    Confirmed,
    /// The item was already selected at actuation time; nothing was done.
    AlreadySelected,
    /// The item was not cleanly unselected at actuation time; nothing was
    /// done.
    InvalidInitialState,
    /// The toggle was issued but the state change was not observed within
    /// the confirmation bound. The item is skipped, never re-toggled.
    Timeout,
    /// The item became unreachable before or while confirming.
    Detached,
}

impl ToggleReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::AlreadySelected => "already_selected",
            Self::InvalidInitialState => "invalid_initial_state",
            Self::Timeout => "timeout",
            Self::Detached => "detached",
        }
    }
}

impl std::fmt::Display for ToggleReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one actuation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub identity: ItemIdentity,
    pub reason: ToggleReason,
}

impl ToggleOutcome {
    pub fn confirmed(&self) -> bool {
        self.reason == ToggleReason::Confirmed
    }
}

/// Confirmation bounds for the actuator.
#[derive(Debug, Clone, Copy)]
pub struct ActuatorConfig {
    pub confirm_timeout: Duration,
    pub confirm_interval: Duration,
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        Self {
            confirm_timeout: Duration::from_secs(5),
            confirm_interval: Duration::from_millis(150),
        }
    }
}

/// Performs toggles against the view, one item at a time.
pub struct SelectionActuator {
    view: Arc<dyn ItemView>,
    config: ActuatorConfig,
}

impl SelectionActuator {
    pub fn new(view: Arc<dyn ItemView>, config: ActuatorConfig) -> Self {
        Self { view, config }
    }

    /// Try to select one item.
    ///
    /// Re-reads the live state first (the listing snapshot may be stale),
    /// issues exactly zero or one toggle, then polls for the selected state
    /// until the confirmation bound elapses. Per-item failures resolve into
    /// the outcome; only view-level failures propagate as errors.
    pub async fn select(&self, item: &ListedItem) -> Result<ToggleOutcome, SessionError> {
        let outcome = |reason| ToggleOutcome {
            identity: item.identity.clone(),
            reason,
        };

        // State may have changed since the item was listed.
        match self.view.item_state(item.handle).await {
            Ok(ItemState::Unselected) => {}
            Ok(ItemState::Selected) => return Ok(outcome(ToggleReason::AlreadySelected)),
            Ok(ItemState::Indeterminate) => {
                return Ok(outcome(ToggleReason::InvalidInitialState))
            }
            Err(ViewError::Detached { .. }) => return Ok(outcome(ToggleReason::Detached)),
            Err(err) => return Err(err.into()),
        }

        // The single toggle this call is allowed.
        match self.view.toggle(item.handle).await {
            Ok(()) => {}
            Err(ViewError::Detached { .. }) => return Ok(outcome(ToggleReason::Detached)),
            Err(err) => return Err(err.into()),
        }

        let schedule = PollSchedule::new(self.config.confirm_timeout, self.config.confirm_interval);
        let mut ticks = schedule.ticks();
        while ticks.next().await {
            match self.view.is_attached(item.handle).await {
                Ok(true) => {}
                Ok(false) => return Ok(outcome(ToggleReason::Detached)),
                Err(err) => return Err(err.into()),
            }
            match self.view.item_state(item.handle).await {
                Ok(ItemState::Selected) => return Ok(outcome(ToggleReason::Confirmed)),
                Ok(_) => {}
                Err(ViewError::Detached { .. }) => return Ok(outcome(ToggleReason::Detached)),
                Err(err) => return Err(err.into()),
            }
        }

        Ok(outcome(ToggleReason::Timeout))
    }
}
