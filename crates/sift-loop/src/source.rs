//! Item source: identity derivation and snapshot listing over an
//! `ItemView`.
//!
//! Identity policy: prefer the descriptive label the host UI exposes; when
//! no label is present, fall back to a signature derived from the item's
//! on-screen geometry rounded to a configured precision. The fallback is an
//! accepted precision/recall trade-off: it does not survive layout shifts
//! and may under- or over-merge distinct items, and under virtualization a
//! later-rendered item can reuse an already-processed geometry key and be
//! skipped. Neither is silently repaired.

use std::sync::Arc;

use sift_view::error::ViewError;
use sift_view::view::{ItemBounds, ItemHandle, ItemState, ItemView};

use crate::error::SessionError;

/// Best-effort-stable key for recognizing the same item across repeated
/// polls of a virtualized list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ItemIdentity {
    /// Derived from a semantically stable label.
    Label(String),
    /// Geometry-fallback signature; weak by design (see module docs).
    Geometry(String),
}

impl ItemIdentity {
    /// Derive an identity for an item. `precision` is the number of decimal
    /// places kept in the geometry fallback.
    pub fn derive(label: Option<&str>, bounds: ItemBounds, precision: usize) -> Self {
        match label {
            Some(label) if !label.is_empty() => Self::Label(label.to_string()),
            _ => Self::Geometry(format!(
                "{:.prec$}|{:.prec$}",
                bounds.top,
                bounds.left,
                prec = precision
            )),
        }
    }

    pub fn key(&self) -> &str {
        match self {
            Self::Label(key) | Self::Geometry(key) => key,
        }
    }

    /// Whether this identity came from a stable label (only these are
    /// worth recording for replay).
    pub fn is_label(&self) -> bool {
        matches!(self, Self::Label(_))
    }
}

impl std::fmt::Display for ItemIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// One item from a listing snapshot: handle, derived identity, and the
/// state observed at listing time. The state is a point-in-time read; the
/// actuator re-reads it before acting.
#[derive(Debug, Clone)]
pub struct ListedItem {
    pub handle: ItemHandle,
    pub identity: ItemIdentity,
    pub state: ItemState,
}

/// Snapshot listing over a view. Stateless: every call re-derives the
/// currently rendered items, so it is safe to call repeatedly.
pub struct ItemSource {
    view: Arc<dyn ItemView>,
    fallback_precision: usize,
}

impl ItemSource {
    pub fn new(view: Arc<dyn ItemView>, fallback_precision: usize) -> Self {
        Self {
            view,
            fallback_precision,
        }
    }

    /// List the currently rendered items with derived identities. Items
    /// that detach while being enumerated are skipped; the view is
    /// externally mutable and torn reads are expected.
    pub async fn list_visible(&self) -> Result<Vec<ListedItem>, SessionError> {
        let handles = self.view.list_items().await?;
        let mut items = Vec::with_capacity(handles.len());
        for handle in handles {
            let state = match self.view.item_state(handle).await {
                Ok(state) => state,
                Err(ViewError::Detached { .. }) => continue,
                Err(err) => return Err(err.into()),
            };
            let label = match self.view.item_label(handle).await {
                Ok(label) => label,
                Err(ViewError::Detached { .. }) => continue,
                Err(err) => return Err(err.into()),
            };
            let bounds = match self.view.item_bounds(handle).await {
                Ok(bounds) => bounds,
                Err(ViewError::Detached { .. }) => continue,
                Err(err) => return Err(err.into()),
            };
            items.push(ListedItem {
                handle,
                identity: ItemIdentity::derive(label.as_deref(), bounds, self.fallback_precision),
                state,
            });
        }
        Ok(items)
    }
}
