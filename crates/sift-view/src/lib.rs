//! sift-view: Interactive view contract for virtualized selection lists.
//!
//! Provides the transport-agnostic `ItemView` trait the selection loop
//! drives (scroll geometry, item handles, tri-state selection reads, the
//! single toggle action), a fully scriptable `SimulatedView` for tests and
//! the CLI simulator, and the optional `SelectionOverlay` collaborator.

pub mod error;
pub mod overlay;
pub mod simulated;
pub mod view;

/// Stable crate label used for bootstrap smoke tests.
pub fn crate_label() -> &'static str {
    "sift-view"
}
