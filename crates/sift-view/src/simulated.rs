//! Scriptable in-memory virtualized list for unit testing and the CLI
//! simulator.
//!
//! Models the behaviors the selection loop has to survive: windowed
//! rendering (only items inside the viewport are listed), lazy content
//! growth at the forward edge, toggle confirmations that land after a
//! number of state polls or never, and items detaching mid-wait. Records
//! every toggle call for assertions.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::error::ViewError;
use crate::view::{ItemBounds, ItemHandle, ItemState, ItemView, ScrollFrame};

/// Scripted behavior for one simulated item.
#[derive(Debug, Clone)]
pub struct SimulatedItem {
    pub label: Option<String>,
    pub top: f64,
    pub left: f64,
    pub state: ItemState,
    /// After a toggle, how many `item_state` polls pass before the state
    /// reads as selected. `Some(0)` confirms on the next poll, `None`
    /// never confirms.
    pub confirm_after_polls: Option<u32>,
    /// After a toggle, detach the item once this many `item_state` polls
    /// have happened.
    pub detach_after_polls: Option<u32>,
}

impl SimulatedItem {
    /// An unselected item with a label, confirming on the first poll.
    pub fn unselected(label: &str, top: f64) -> Self {
        Self {
            label: Some(label.to_string()),
            top,
            left: 0.0,
            state: ItemState::Unselected,
            confirm_after_polls: Some(0),
            detach_after_polls: None,
        }
    }

    /// An unselected item with no label (geometry-fallback identity).
    pub fn unlabeled(top: f64, left: f64) -> Self {
        Self {
            label: None,
            top,
            left,
            state: ItemState::Unselected,
            confirm_after_polls: Some(0),
            detach_after_polls: None,
        }
    }

    /// An already-selected item.
    pub fn selected(label: &str, top: f64) -> Self {
        Self {
            state: ItemState::Selected,
            ..Self::unselected(label, top)
        }
    }

    /// An item whose state attribute is not a clean true/false.
    pub fn indeterminate(label: &str, top: f64) -> Self {
        Self {
            state: ItemState::Indeterminate,
            ..Self::unselected(label, top)
        }
    }

    pub fn confirming_after(mut self, polls: u32) -> Self {
        self.confirm_after_polls = Some(polls);
        self
    }

    pub fn never_confirming(mut self) -> Self {
        self.confirm_after_polls = None;
        self
    }

    pub fn detaching_after(mut self, polls: u32) -> Self {
        self.detach_after_polls = Some(polls);
        self
    }
}

#[derive(Debug)]
struct ItemCell {
    label: Option<String>,
    top: f64,
    left: f64,
    state: ItemState,
    attached: bool,
    toggles: u32,
    confirm_after_polls: Option<u32>,
    detach_after_polls: Option<u32>,
    // Armed by a toggle on an unselected item; the flip becomes visible
    // once enough polls have passed.
    confirming: bool,
    polls_since_toggle: u32,
}

#[derive(Debug)]
struct Inner {
    items: Vec<ItemCell>,
    position: f64,
    viewport: f64,
    loaded_extent: f64,
    total_extent: f64,
    lazy_chunk: f64,
    // Lazy growth lands this long after the edge is hit (zero = at once).
    growth_delay: Duration,
    pending_growth: Option<Instant>,
    container_available: bool,
    frozen_scroll: bool,
    toggle_calls: Vec<u64>,
}

impl Inner {
    // Apply a scheduled growth chunk once its delay has elapsed. Called
    // before every geometry or listing read.
    fn settle_growth(&mut self) {
        if let Some(due) = self.pending_growth {
            if Instant::now() >= due {
                self.loaded_extent =
                    (self.loaded_extent + self.lazy_chunk).min(self.total_extent);
                self.pending_growth = None;
            }
        }
    }

    fn container_gone() -> ViewError {
        ViewError::ContainerUnavailable {
            message: "no scrollable container in view".to_string(),
        }
    }

    fn cell(&self, handle: ItemHandle) -> Result<&ItemCell, ViewError> {
        self.items
            .get(handle.0 as usize)
            .ok_or(ViewError::Internal {
                message: format!("unknown item handle {}", handle.0),
            })
    }

    fn cell_mut(&mut self, handle: ItemHandle) -> Result<&mut ItemCell, ViewError> {
        self.items
            .get_mut(handle.0 as usize)
            .ok_or(ViewError::Internal {
                message: format!("unknown item handle {}", handle.0),
            })
    }
}

/// In-memory `ItemView` implementation with scriptable behavior.
pub struct SimulatedView {
    inner: Mutex<Inner>,
}

impl SimulatedView {
    /// A view whose loaded content already spans `content_extent` and never
    /// grows.
    pub fn new(viewport: f64, content_extent: f64) -> Self {
        Self {
            inner: Mutex::new(Inner {
                items: Vec::new(),
                position: 0.0,
                viewport,
                loaded_extent: content_extent,
                total_extent: content_extent,
                lazy_chunk: 0.0,
                growth_delay: Duration::ZERO,
                pending_growth: None,
                container_available: true,
                frozen_scroll: false,
                toggle_calls: Vec::new(),
            }),
        }
    }

    /// A view that lazy-loads: content starts at `initial_extent` and grows
    /// by `chunk` each time a scroll reaches the loaded forward edge, up to
    /// `total_extent`.
    pub fn lazy(viewport: f64, initial_extent: f64, total_extent: f64, chunk: f64) -> Self {
        let view = Self::new(viewport, initial_extent);
        {
            let mut inner = view.lock();
            inner.total_extent = total_extent;
            inner.lazy_chunk = chunk;
        }
        view
    }

    /// Append a scripted item. Handles are assigned in insertion order,
    /// starting at 0.
    pub fn with_item(self, item: SimulatedItem) -> Self {
        self.lock().items.push(ItemCell {
            label: item.label,
            top: item.top,
            left: item.left,
            state: item.state,
            attached: true,
            toggles: 0,
            confirm_after_polls: item.confirm_after_polls,
            detach_after_polls: item.detach_after_polls,
            confirming: false,
            polls_since_toggle: 0,
        });
        self
    }

    /// Make lazy growth land this long after the edge is hit instead of
    /// at once, the way a live list loads content asynchronously.
    pub fn with_growth_delay(self, delay: Duration) -> Self {
        self.lock().growth_delay = delay;
        self
    }

    /// Make the scroll container unreachable (fatal at session startup).
    pub fn without_container(self) -> Self {
        self.lock().container_available = false;
        self
    }

    /// Ignore all scroll requests: the position never changes and content
    /// never grows.
    pub fn with_frozen_scroll(self) -> Self {
        self.lock().frozen_scroll = true;
        self
    }

    /// Detach an item out from under the loop.
    pub fn detach(&self, handle: ItemHandle) {
        let mut inner = self.lock();
        if let Some(cell) = inner.items.get_mut(handle.0 as usize) {
            cell.attached = false;
        }
    }

    /// Force an item's visible state (simulates the host page mutating it).
    pub fn set_item_state(&self, handle: ItemHandle, state: ItemState) {
        let mut inner = self.lock();
        if let Some(cell) = inner.items.get_mut(handle.0 as usize) {
            cell.state = state;
            cell.confirming = false;
        }
    }

    /// Every toggle call, in order, by handle id.
    pub fn toggle_calls(&self) -> Vec<u64> {
        self.lock().toggle_calls.clone()
    }

    /// Toggle calls issued against one handle.
    pub fn toggle_count(&self, handle: ItemHandle) -> u32 {
        self.lock()
            .items
            .get(handle.0 as usize)
            .map(|c| c.toggles)
            .unwrap_or(0)
    }

    /// The current scroll position.
    pub fn position(&self) -> f64 {
        self.lock().position
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl ItemView for SimulatedView {
    async fn scroll_frame(&self) -> Result<ScrollFrame, ViewError> {
        let mut inner = self.lock();
        if !inner.container_available {
            return Err(Inner::container_gone());
        }
        inner.settle_growth();
        Ok(ScrollFrame {
            position: inner.position,
            viewport_extent: inner.viewport,
            content_extent: inner.loaded_extent,
        })
    }

    async fn set_scroll_position(&self, position: f64) -> Result<(), ViewError> {
        let mut inner = self.lock();
        if !inner.container_available {
            return Err(Inner::container_gone());
        }
        if inner.frozen_scroll {
            return Ok(());
        }
        inner.settle_growth();
        let max = (inner.loaded_extent - inner.viewport).max(0.0);
        inner.position = position.clamp(0.0, max);
        // Hitting the loaded forward edge makes the host list load more
        // content, until the total is reached.
        if inner.position >= max
            && inner.loaded_extent < inner.total_extent
            && inner.lazy_chunk > 0.0
        {
            if inner.growth_delay.is_zero() {
                inner.loaded_extent =
                    (inner.loaded_extent + inner.lazy_chunk).min(inner.total_extent);
            } else if inner.pending_growth.is_none() {
                inner.pending_growth = Some(Instant::now() + inner.growth_delay);
            }
        }
        Ok(())
    }

    async fn list_items(&self) -> Result<Vec<ItemHandle>, ViewError> {
        let mut inner = self.lock();
        if !inner.container_available {
            return Err(Inner::container_gone());
        }
        inner.settle_growth();
        let window_start = inner.position;
        let window_end = inner.position + inner.viewport;
        Ok(inner
            .items
            .iter()
            .enumerate()
            .filter(|(_, cell)| {
                cell.attached
                    && cell.top < inner.loaded_extent
                    && cell.top >= window_start
                    && cell.top < window_end
            })
            .map(|(idx, _)| ItemHandle(idx as u64))
            .collect())
    }

    async fn item_state(&self, handle: ItemHandle) -> Result<ItemState, ViewError> {
        let mut inner = self.lock();
        let cell = inner.cell_mut(handle)?;
        if !cell.attached {
            return Err(ViewError::Detached { handle: handle.0 });
        }
        if cell.confirming {
            cell.polls_since_toggle += 1;
            if let Some(after) = cell.detach_after_polls {
                if cell.polls_since_toggle > after {
                    cell.attached = false;
                    return Err(ViewError::Detached { handle: handle.0 });
                }
            }
            if let Some(after) = cell.confirm_after_polls {
                if cell.polls_since_toggle > after {
                    cell.state = ItemState::Selected;
                    cell.confirming = false;
                }
            }
        }
        Ok(cell.state)
    }

    async fn item_label(&self, handle: ItemHandle) -> Result<Option<String>, ViewError> {
        let inner = self.lock();
        let cell = inner.cell(handle)?;
        if !cell.attached {
            return Err(ViewError::Detached { handle: handle.0 });
        }
        Ok(cell.label.clone())
    }

    async fn item_bounds(&self, handle: ItemHandle) -> Result<ItemBounds, ViewError> {
        let inner = self.lock();
        let cell = inner.cell(handle)?;
        if !cell.attached {
            return Err(ViewError::Detached { handle: handle.0 });
        }
        // On-screen coordinates: content offset minus scroll position, which
        // is exactly why geometry-derived identities do not survive layout
        // shifts.
        Ok(ItemBounds {
            top: cell.top - inner.position,
            left: cell.left,
        })
    }

    async fn toggle(&self, handle: ItemHandle) -> Result<(), ViewError> {
        let mut inner = self.lock();
        inner.toggle_calls.push(handle.0);
        let cell = inner.cell_mut(handle)?;
        if !cell.attached {
            return Err(ViewError::Detached { handle: handle.0 });
        }
        cell.toggles += 1;
        cell.polls_since_toggle = 0;
        match cell.state {
            ItemState::Unselected => {
                cell.confirming = true;
            }
            ItemState::Selected => {
                // A second toggle undoes the selection immediately; this is
                // exactly what the loop must never cause.
                cell.state = ItemState::Unselected;
                cell.confirming = false;
            }
            ItemState::Indeterminate => {}
        }
        Ok(())
    }

    async fn is_attached(&self, handle: ItemHandle) -> Result<bool, ViewError> {
        let inner = self.lock();
        Ok(inner.cell(handle)?.attached)
    }
}
