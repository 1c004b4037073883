//! Normalized error type for interactive view operations.
//!
//! Adapter-agnostic errors that hide the backing list implementation
//! (browser page, simulator) and give the selection loop actionable
//! categories.

use std::fmt;

/// Normalized error for view operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    /// The scrollable container cannot be located. Fatal to a session.
    ContainerUnavailable { message: String },

    /// The item handle no longer refers to a rendered element. The host
    /// list recycles elements at will; callers treat this as a normal
    /// per-item outcome, not a failure.
    Detached { handle: u64 },

    /// The backing adapter failed in an unexpected way.
    Internal { message: String },
}

impl fmt::Display for ViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContainerUnavailable { message } => {
                write!(f, "scroll container unavailable: {message}")
            }
            Self::Detached { handle } => write!(f, "item handle {handle} is detached"),
            Self::Internal { message } => write!(f, "view internal error: {message}"),
        }
    }
}

impl std::error::Error for ViewError {}

impl ViewError {
    /// Whether this error ends a session (as opposed to a per-item outcome).
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ContainerUnavailable { .. })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::ViewError;

    #[test]
    fn only_container_unavailable_is_fatal() {
        assert!(ViewError::ContainerUnavailable {
            message: "gone".into()
        }
        .is_fatal());
        assert!(!ViewError::Detached { handle: 3 }.is_fatal());
        assert!(!ViewError::Internal {
            message: "boom".into()
        }
        .is_fatal());
    }

    #[test]
    fn display_includes_the_handle() {
        let msg = ViewError::Detached { handle: 17 }.to_string();
        assert!(msg.contains("17"));
    }
}
