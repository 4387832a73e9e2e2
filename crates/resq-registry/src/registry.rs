//! The entity table and its graph operations.

use indexmap::{IndexMap, IndexSet};
use resq_core::{Entity, EntityId};

use crate::error::RegistryError;
use crate::index::ReverseIndex;

/// What [`Registry::remove`] does when other entities reference the target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RemoveMode {
    /// Refuse with [`RegistryError::DanglingReference`].
    #[default]
    Restrict,
    /// Remove every transitive dependent as well.
    Cascade,
}

/// Arena of entities keyed by [`EntityId`].
///
/// Ids are issued from a monotonic counter starting at 1 and are never
/// reused, even after removal. Iteration follows insertion order.
///
/// Every registered entity only references entities that were already
/// registered, so the reference graph is acyclic; [`repoint`](Self::repoint)
/// checks reachability before rewriting an edge.
#[derive(Clone, Debug)]
pub struct Registry<E: Entity> {
    entries: IndexMap<EntityId, E>,
    index: ReverseIndex,
    next_id: u64,
}

impl<E: Entity> Default for Registry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> Registry<E> {
    /// First id handed out by an empty registry.
    pub const FIRST_ID: u64 = 1;

    /// An empty registry.
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
            index: ReverseIndex::new(),
            next_id: Self::FIRST_ID,
        }
    }

    /// Assign a fresh id to `entity` and store it.
    pub fn register(&mut self, mut entity: E) -> Result<EntityId, RegistryError> {
        if let Some(id) = entity.id() {
            return Err(RegistryError::DuplicateEntity { id });
        }
        let id = EntityId(self.next_id);
        let next = self
            .next_id
            .checked_add(1)
            .ok_or(RegistryError::IdSpaceExhausted { id })?;
        let refs = entity.references();
        self.check_references(id, &refs)?;
        entity
            .header_mut()
            .assign_id(id)
            .map_err(|existing| RegistryError::DuplicateEntity { id: existing })?;
        self.insert(id, entity, &refs);
        self.next_id = next;
        tracing::debug!(%id, refs = refs.len(), "registered entity");
        Ok(id)
    }

    /// Insert an entity that already carries an id (deserialization path).
    ///
    /// Entities without an id are registered normally. The id counter is
    /// advanced past every restored id.
    pub fn restore(&mut self, entity: E) -> Result<EntityId, RegistryError> {
        let Some(id) = entity.id() else {
            return self.register(entity);
        };
        if self.entries.contains_key(&id) {
            return Err(RegistryError::DuplicateEntity { id });
        }
        // The counter must stay ahead of every stored id.
        let after = id
            .get()
            .checked_add(1)
            .ok_or(RegistryError::IdSpaceExhausted { id })?;
        let refs = entity.references();
        self.check_references(id, &refs)?;
        self.insert(id, entity, &refs);
        self.next_id = self.next_id.max(after);
        Ok(id)
    }

    fn check_references(&self, id: EntityId, refs: &[EntityId]) -> Result<(), RegistryError> {
        for &r in refs {
            if r == id {
                return Err(RegistryError::CycleDetected { from: id, to: r });
            }
            if !self.entries.contains_key(&r) {
                return Err(RegistryError::UnknownEntity { id: r });
            }
        }
        Ok(())
    }

    fn insert(&mut self, id: EntityId, entity: E, refs: &[EntityId]) {
        for &r in refs {
            self.index.link(id, r);
        }
        self.entries.insert(id, entity);
    }

    /// The entity with `id`.
    pub fn resolve(&self, id: EntityId) -> Result<&E, RegistryError> {
        self.entries
            .get(&id)
            .ok_or(RegistryError::UnknownEntity { id })
    }

    /// The entity with `id`, if registered.
    pub fn get(&self, id: EntityId) -> Option<&E> {
        self.entries.get(&id)
    }

    /// `true` when `id` is registered.
    pub fn contains(&self, id: EntityId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Number of registered entities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entities in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &E)> + Clone {
        self.entries.iter().map(|(&id, e)| (id, e))
    }

    /// Ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entries.keys().copied()
    }

    /// The id the next [`register`](Self::register) call will issue.
    pub fn next_id(&self) -> EntityId {
        EntityId(self.next_id)
    }

    /// Direct referrers of `id`, in the order the references were made.
    pub fn referrers(&self, id: EntityId) -> Result<Vec<EntityId>, RegistryError> {
        self.resolve(id)?;
        Ok(self.index.referrers(id).collect())
    }

    /// All entities that depend on `id` directly or transitively,
    /// breadth-first.
    pub fn dependents(&self, id: EntityId) -> Result<Vec<EntityId>, RegistryError> {
        self.resolve(id)?;
        let mut seen = IndexSet::new();
        let mut frontier = vec![id];
        while !frontier.is_empty() {
            let mut next = Vec::new();
            for node in frontier {
                for r in self.index.referrers(node) {
                    if seen.insert(r) {
                        next.push(r);
                    }
                }
            }
            frontier = next;
        }
        Ok(seen.into_iter().collect())
    }

    /// Remove `id`.
    ///
    /// With [`RemoveMode::Cascade`] every transitive dependent is removed
    /// too. Removed entities are returned with dependents ahead of the
    /// entities they reference; the requested entity is last.
    pub fn remove(&mut self, id: EntityId, mode: RemoveMode) -> Result<Vec<E>, RegistryError> {
        self.resolve(id)?;
        let order = match mode {
            RemoveMode::Restrict => {
                let referrers: Vec<_> = self.index.referrers(id).collect();
                if !referrers.is_empty() {
                    return Err(RegistryError::DanglingReference { id, referrers });
                }
                vec![id]
            }
            RemoveMode::Cascade => self.removal_order(id),
        };
        let mut removed = Vec::with_capacity(order.len());
        for victim in order {
            if let Some(entity) = self.entries.shift_remove(&victim) {
                for r in entity.references() {
                    self.index.unlink(victim, r);
                }
                if victim != id {
                    tracing::debug!(%victim, root = %id, "cascade removal");
                }
                removed.push(entity);
            }
        }
        Ok(removed)
    }

    /// Post-order walk over referrers: every entity appears after all
    /// entities that reference it.
    fn removal_order(&self, root: EntityId) -> Vec<EntityId> {
        let mut order = Vec::new();
        let mut visited = IndexSet::new();
        let mut stack: Vec<(EntityId, Vec<EntityId>)> =
            vec![(root, self.index.referrers(root).collect())];
        visited.insert(root);
        while let Some((node, pending)) = stack.last_mut() {
            match pending.pop() {
                Some(next) => {
                    if visited.insert(next) {
                        let children = self.index.referrers(next).collect();
                        stack.push((next, children));
                    }
                }
                None => {
                    order.push(*node);
                    stack.pop();
                }
            }
        }
        order
    }

    /// Rewrite `referrer`'s reference to `old` so it points at `new`.
    pub fn repoint(
        &mut self,
        referrer: EntityId,
        old: EntityId,
        new: EntityId,
    ) -> Result<(), RegistryError> {
        let before = self.resolve(referrer)?.references();
        self.resolve(new)?;
        if !before.contains(&old) {
            return Err(RegistryError::MissingReference {
                referrer,
                target: old,
            });
        }
        if new == referrer || self.dependents(referrer)?.contains(&new) {
            return Err(RegistryError::CycleDetected { from: referrer, to: new });
        }
        let entity = self
            .entries
            .get_mut(&referrer)
            .ok_or(RegistryError::UnknownEntity { id: referrer })?;
        entity.retarget(old, new);
        let after = entity.references();
        self.index.relink(referrer, &before, &after);
        tracing::debug!(%referrer, %old, %new, "repointed reference");
        Ok(())
    }

    /// Topological order of all entities: every entity follows the
    /// entities it references. Ties keep insertion order, so a registry
    /// that was filled in dependency order yields its insertion order.
    pub fn topological_order(&self) -> Vec<EntityId> {
        let mut order = IndexSet::with_capacity(self.entries.len());
        for (&id, _) in &self.entries {
            let mut stack = vec![(id, false)];
            while let Some((node, expanded)) = stack.pop() {
                if order.contains(&node) {
                    continue;
                }
                if expanded {
                    order.insert(node);
                    continue;
                }
                stack.push((node, true));
                if let Some(entity) = self.entries.get(&node) {
                    for r in entity.references().into_iter().rev() {
                        if !order.contains(&r) {
                            stack.push((r, false));
                        }
                    }
                }
            }
        }
        order.into_iter().collect()
    }
}

impl<E: Entity + Clone> Registry<E> {
    /// Apply `f` to the entity with `id`.
    ///
    /// `f` runs against a copy; the copy replaces the stored entity only if
    /// its id and references are unchanged. Use [`repoint`](Self::repoint)
    /// to change references.
    pub fn update<R>(
        &mut self,
        id: EntityId,
        f: impl FnOnce(&mut E) -> R,
    ) -> Result<R, RegistryError> {
        let current = self.resolve(id)?;
        let refs = current.references();
        let mut draft = current.clone();
        let out = f(&mut draft);
        if draft.id() != Some(id) || draft.references() != refs {
            return Err(RegistryError::ReferencesChanged { id });
        }
        if let Some(slot) = self.entries.get_mut(&id) {
            *slot = draft;
        }
        Ok(out)
    }
}
