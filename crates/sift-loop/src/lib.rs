//! sift-loop: the incremental discovery–select–confirm–scroll core.
//!
//! Drives an `ItemView` (a virtualized, infinite-scroll selection list)
//! through repeated rounds of: list the rendered items, select the ones not
//! yet decided on, confirm each toggle actually took effect, scroll to
//! reveal more, and wait for new content — until a target count is reached
//! or the list stops making progress.
//!
//! The central correctness invariant lives in the actuator: a toggle is
//! issued at most once per item identity and is confirmed by polling, never
//! "fixed" by a second toggle (which could undo a selection that did land).

pub mod actuator;
pub mod director;
pub mod error;
pub mod event;
pub mod pace;
pub mod poll;
pub mod progress;
pub mod registry;
pub mod runner;
pub mod session;
pub mod source;

/// Stable crate label used for bootstrap smoke tests.
pub fn crate_label() -> &'static str {
    "sift-loop"
}
