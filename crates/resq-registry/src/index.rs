//! Reverse-reference index: target id → set of entities referencing it.
//!
//! Maintained incrementally by the registry on every insert, removal and
//! re-point, so dangling and cycle checks cost O(referrers) rather than a
//! scan of the whole table.

use indexmap::{IndexMap, IndexSet};
use resq_core::EntityId;

/// Maps each referenced entity to its direct referrers, in link order.
#[derive(Clone, Debug, Default)]
pub struct ReverseIndex {
    referrers: IndexMap<EntityId, IndexSet<EntityId>>,
}

impl ReverseIndex {
    /// An empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `from` references `to`.
    pub fn link(&mut self, from: EntityId, to: EntityId) {
        self.referrers.entry(to).or_default().insert(from);
    }

    /// Forget that `from` references `to`.
    pub fn unlink(&mut self, from: EntityId, to: EntityId) {
        if let Some(set) = self.referrers.get_mut(&to) {
            set.shift_remove(&from);
            if set.is_empty() {
                self.referrers.shift_remove(&to);
            }
        }
    }

    /// Replace the outgoing edges of `from`.
    pub fn relink(&mut self, from: EntityId, before: &[EntityId], after: &[EntityId]) {
        for &t in before {
            if !after.contains(&t) {
                self.unlink(from, t);
            }
        }
        for &t in after {
            self.link(from, t);
        }
    }

    /// Direct referrers of `id`, in link order.
    pub fn referrers(&self, id: EntityId) -> impl Iterator<Item = EntityId> + '_ {
        self.referrers
            .get(&id)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// `true` when something references `id`.
    pub fn is_referenced(&self, id: EntityId) -> bool {
        self.referrers.contains_key(&id)
    }

    /// Number of entities with at least one referrer.
    pub fn target_count(&self) -> usize {
        self.referrers.len()
    }
}
