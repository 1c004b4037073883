//! Session-level errors.
//!
//! Per-item failures (unconfirmed toggles, detached items, unclean initial
//! states) are absorbed into `ToggleOutcome`s and never surface here; the
//! session only errors when the view itself becomes unusable.

use std::fmt;

use sift_view::error::ViewError;

/// Fatal session failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The scrollable container could not be located. Raised at startup,
    /// or mid-session if the container disappears entirely.
    ViewUnavailable { message: String },

    /// The view failed in a way the session cannot absorb.
    View { message: String },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ViewUnavailable { message } => write!(f, "view unavailable: {message}"),
            Self::View { message } => write!(f, "view error: {message}"),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<ViewError> for SessionError {
    fn from(err: ViewError) -> Self {
        match err {
            ViewError::ContainerUnavailable { message } => Self::ViewUnavailable { message },
            other => Self::View {
                message: other.to_string(),
            },
        }
    }
}
