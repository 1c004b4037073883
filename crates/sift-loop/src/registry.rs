//! Session-scoped dedup registry.
//!
//! A virtualized list keeps items rendered across many polls; without this
//! set the same item would be reconsidered, and potentially re-toggled,
//! every round. Once an identity is marked it is never revisited for the
//! rest of the session, even if the underlying element detaches and a later
//! element reuses the same (geometry-fallback) key.

use std::collections::HashSet;

use crate::source::ItemIdentity;

/// Monotone set of identities already decided upon — selected, confirmed,
/// or explicitly skipped. There is deliberately no removal API.
#[derive(Debug, Default)]
pub struct IdentityRegistry {
    processed: HashSet<ItemIdentity>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, identity: &ItemIdentity) -> bool {
        self.processed.contains(identity)
    }

    /// Mark an identity as decided. Returns true if it was newly marked.
    pub fn mark_processed(&mut self, identity: ItemIdentity) -> bool {
        self.processed.insert(identity)
    }

    pub fn len(&self) -> usize {
        self.processed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processed.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::IdentityRegistry;
    use crate::source::ItemIdentity;

    #[test]
    fn marking_is_idempotent_and_monotone() {
        let mut registry = IdentityRegistry::new();
        let id = ItemIdentity::Label("day one".into());

        assert!(!registry.has(&id));
        assert!(registry.mark_processed(id.clone()));
        assert!(registry.has(&id));
        assert!(!registry.mark_processed(id.clone()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn label_and_geometry_keys_do_not_collide() {
        let mut registry = IdentityRegistry::new();
        registry.mark_processed(ItemIdentity::Label("10.0|0.0".into()));

        assert!(!registry.has(&ItemIdentity::Geometry("10.0|0.0".into())));
        registry.mark_processed(ItemIdentity::Geometry("10.0|0.0".into()));
        assert_eq!(registry.len(), 2);
    }
}
