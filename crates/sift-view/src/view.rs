//! The interactive view contract — the primary abstraction the selection
//! loop drives.
//!
//! Implementations can be backed by a live page (a scrollable virtualized
//! list with tri-state checkbox items) or by the in-memory `SimulatedView`
//! for testing.

use async_trait::async_trait;

use crate::error::ViewError;

/// Opaque handle to one currently rendered item.
///
/// A handle is only valid while the host list keeps the underlying element
/// rendered; operations on a recycled handle report `ViewError::Detached`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemHandle(pub u64);

impl std::fmt::Display for ItemHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Tri-state selection state read from the item's interactive role
/// attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemState {
    Selected,
    Unselected,
    /// Not clearly selected or unselected. Covers every attribute value
    /// other than the exact `"true"`/`"false"` literals, including a
    /// missing attribute. Always treated conservatively: never acted on.
    Indeterminate,
}

impl ItemState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Selected => "selected",
            Self::Unselected => "unselected",
            Self::Indeterminate => "indeterminate",
        }
    }

    /// Classify a raw tri-state attribute value. The wire contract is
    /// bit-exact: state is never inferred from absence.
    pub fn from_attribute(attr: Option<&str>) -> Self {
        match attr {
            Some("true") => Self::Selected,
            Some("false") => Self::Unselected,
            _ => Self::Indeterminate,
        }
    }
}

impl std::fmt::Display for ItemState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// On-screen bounds of a rendered item, the fallback identity source when
/// the host UI exposes no stable label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemBounds {
    pub top: f64,
    pub left: f64,
}

/// Snapshot of the scroll container geometry. Recomputed every step; never
/// cached across scrolls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollFrame {
    /// Current scroll offset from the start of the content.
    pub position: f64,
    /// Visible extent of the container.
    pub viewport_extent: f64,
    /// Total extent of the currently loaded content. Grows as the host
    /// list lazy-loads more items at the appending end.
    pub content_extent: f64,
}

impl ScrollFrame {
    /// The largest valid scroll position for the current content.
    pub fn max_position(&self) -> f64 {
        (self.content_extent - self.viewport_extent).max(0.0)
    }

    /// Clamp a requested position into the valid range.
    pub fn clamp(&self, position: f64) -> f64 {
        position.clamp(0.0, self.max_position())
    }
}

/// The interactive view interface.
///
/// All operations are async so that a browser-backed adapter can be slotted
/// in without changing the loop. The underlying view is externally mutable:
/// any call may observe the list mid-re-render, so `Detached` is a normal
/// per-item outcome rather than a failure.
#[async_trait]
pub trait ItemView: Send + Sync {
    /// Read the current scroll geometry.
    async fn scroll_frame(&self) -> Result<ScrollFrame, ViewError>;

    /// Move the scroll position. Implementations clamp to the valid range.
    async fn set_scroll_position(&self, position: f64) -> Result<(), ViewError>;

    /// Handles for the items currently rendered, in layout order. A fresh
    /// snapshot every call; safe to call repeatedly.
    async fn list_items(&self) -> Result<Vec<ItemHandle>, ViewError>;

    /// The item's tri-state selection state.
    async fn item_state(&self, handle: ItemHandle) -> Result<ItemState, ViewError>;

    /// The item's descriptive label, if the host UI exposes one.
    async fn item_label(&self, handle: ItemHandle) -> Result<Option<String>, ViewError>;

    /// The item's on-screen bounds.
    async fn item_bounds(&self, handle: ItemHandle) -> Result<ItemBounds, ViewError>;

    /// Perform the single user-equivalent action that flips the item's
    /// selection state. Callers confirm the flip via `item_state`; the
    /// view gives no synchronous acknowledgement.
    async fn toggle(&self, handle: ItemHandle) -> Result<(), ViewError>;

    /// Whether the handle still refers to a rendered element.
    async fn is_attached(&self, handle: ItemHandle) -> Result<bool, ViewError>;
}
