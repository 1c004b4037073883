//! Optional visibility overlay collaborator.
//!
//! The overlay visually suppresses already-selected items while a session
//! runs (pure presentation, reversible); it has no effect on the selection
//! logic. Sessions apply it at start and clear it on any exit path.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::ViewError;

/// A reversible presentation layer over the view.
#[async_trait]
pub trait SelectionOverlay: Send + Sync {
    /// Start suppressing already-selected items.
    async fn apply(&self) -> Result<(), ViewError>;

    /// Restore the view to its untouched presentation.
    async fn clear(&self) -> Result<(), ViewError>;
}

/// No-op overlay for sessions that do not hide anything.
pub struct NullOverlay;

#[async_trait]
impl SelectionOverlay for NullOverlay {
    async fn apply(&self) -> Result<(), ViewError> {
        Ok(())
    }

    async fn clear(&self) -> Result<(), ViewError> {
        Ok(())
    }
}

/// Test double that records apply/clear transitions.
#[derive(Default)]
pub struct RecordingOverlay {
    transitions: Mutex<Vec<bool>>,
}

impl RecordingOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the overlay is currently applied.
    pub fn is_applied(&self) -> bool {
        self.snapshot().last().copied().unwrap_or(false)
    }

    /// The full apply/clear history (`true` = applied).
    pub fn snapshot(&self) -> Vec<bool> {
        match self.transitions.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn record(&self, applied: bool) {
        match self.transitions.lock() {
            Ok(mut guard) => guard.push(applied),
            Err(poisoned) => poisoned.into_inner().push(applied),
        }
    }
}

#[async_trait]
impl SelectionOverlay for RecordingOverlay {
    async fn apply(&self) -> Result<(), ViewError> {
        self.record(true);
        Ok(())
    }

    async fn clear(&self) -> Result<(), ViewError> {
        self.record(false);
        Ok(())
    }
}
