//! Session event recording for observability.
//!
//! The loop narrates itself through a sink: start, per-item outcomes,
//! scroll steps, direction flips, idle warnings, and the final summary.
//! Sinks can print to a console, buffer for assertions, or discard.

use chrono::{DateTime, Utc};

use crate::actuator::ToggleReason;
use crate::director::{DirectionMode, ScrollDirection};
use crate::session::SessionStatus;

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEventKind {
    Started {
        target: Option<u32>,
        mode: DirectionMode,
    },
    /// A toggle was confirmed; `achieved` is the running count.
    ItemSelected {
        identity: String,
        achieved: u32,
    },
    /// An item was decided without a confirmed selection.
    ItemSkipped {
        identity: String,
        reason: ToggleReason,
    },
    ScrollStep {
        direction: ScrollDirection,
    },
    /// A scroll step surfaced nothing new; `streak` is the consecutive
    /// count so far.
    IdleStep {
        streak: u32,
    },
    /// Adaptive mode gave up on one direction.
    DirectionFlipped {
        direction: ScrollDirection,
    },
    Finished {
        status: SessionStatus,
        achieved: u32,
        processed: usize,
    },
}

/// A timestamped session event.
#[derive(Debug, Clone)]
pub struct SessionEvent {
    pub timestamp: DateTime<Utc>,
    pub kind: SessionEventKind,
}

impl SessionEvent {
    pub fn new(kind: SessionEventKind) -> Self {
        Self {
            timestamp: Utc::now(),
            kind,
        }
    }
}

/// Trait for sinks that receive session events.
pub trait SessionEventSink: Send + Sync {
    fn record(&self, event: SessionEvent);
}

/// In-memory event sink for testing.
#[derive(Default)]
pub struct InMemoryEventSink {
    events: std::sync::Mutex<Vec<SessionEvent>>,
}

impl InMemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SessionEvent> {
        match self.events.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn kinds(&self) -> Vec<SessionEventKind> {
        self.events().into_iter().map(|e| e.kind).collect()
    }

    pub fn count(&self) -> usize {
        match self.events.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}

impl SessionEventSink for InMemoryEventSink {
    fn record(&self, event: SessionEvent) {
        match self.events.lock() {
            Ok(mut guard) => guard.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}

/// No-op event sink that discards all events.
pub struct NullEventSink;

impl SessionEventSink for NullEventSink {
    fn record(&self, _event: SessionEvent) {}
}
