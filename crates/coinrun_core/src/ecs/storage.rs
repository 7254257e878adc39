//! # Component Storage
//!
//! Dense, packed component storage.
//!
//! The storage uses a sparse/dense strategy:
//! - `sparse` is pre-allocated to the registry capacity and maps an entity
//!   index to a slot in the dense arrays
//! - `dense` holds component values contiguously (cache-friendly iteration)
//! - Removal swaps the last value into the hole, keeping the array packed

use std::any::Any;

use super::component::Component;
use super::entity::EntityId;

/// Marker for an unused sparse entry.
const VACANT: u32 = u32::MAX;

/// Type-erased operations the registry needs on every storage.
///
/// Used when destroying entities, where the concrete component types are
/// not known statically.
pub(crate) trait AnyStorage: Send + Sync {
    /// Drops the component owned by `entity`, if any.
    fn remove_entity(&mut self, entity: EntityId) -> bool;

    /// Drops every component.
    fn clear(&mut self);

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Packed storage for a single component type.
///
/// # Type Parameters
///
/// * `C` - The component type to store
///
/// # Example
///
/// ```rust,ignore
/// let mut storage: ComponentStorage<Position> = ComponentStorage::new(1024);
/// storage.insert(entity, Position { x: 1.0, y: 2.0 });
/// ```
pub struct ComponentStorage<C: Component> {
    /// Entity index -> dense slot.
    sparse: Box<[u32]>,
    /// Component values, packed.
    dense: Vec<C>,
    /// Owner of each dense slot.
    owners: Vec<EntityId>,
}

impl<C: Component> ComponentStorage<C> {
    /// Creates storage able to address `capacity` entity indices.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");

        Self {
            sparse: vec![VACANT; capacity].into_boxed_slice(),
            dense: Vec::with_capacity(capacity.min(1024)),
            owners: Vec::with_capacity(capacity.min(1024)),
        }
    }

    #[inline]
    fn slot(&self, entity: EntityId) -> Option<usize> {
        let slot = *self.sparse.get(entity.index() as usize)?;
        if slot == VACANT {
            return None;
        }
        let slot = slot as usize;
        // A stale id with the same index must not alias the new owner.
        (self.owners[slot] == entity).then_some(slot)
    }

    /// Inserts or overwrites the component for `entity`.
    ///
    /// Returns the previous value if one was present.
    pub fn insert(&mut self, entity: EntityId, component: C) -> Option<C> {
        if let Some(slot) = self.slot(entity) {
            return Some(std::mem::replace(&mut self.dense[slot], component));
        }

        let index = entity.index() as usize;
        if index >= self.sparse.len() {
            return None;
        }

        self.sparse[index] = self.dense.len() as u32;
        self.dense.push(component);
        self.owners.push(entity);
        None
    }

    /// Removes and returns the component for `entity`.
    pub fn remove(&mut self, entity: EntityId) -> Option<C> {
        let slot = self.slot(entity)?;

        let last = self.dense.len() - 1;
        self.dense.swap(slot, last);
        self.owners.swap(slot, last);

        if slot != last {
            let moved = self.owners[slot];
            self.sparse[moved.index() as usize] = slot as u32;
        }

        self.sparse[entity.index() as usize] = VACANT;
        self.owners.pop();
        self.dense.pop()
    }

    /// Gets the component for `entity`.
    #[inline]
    #[must_use]
    pub fn get(&self, entity: EntityId) -> Option<&C> {
        self.slot(entity).map(|slot| &self.dense[slot])
    }

    /// Gets the component for `entity` mutably.
    #[inline]
    pub fn get_mut(&mut self, entity: EntityId) -> Option<&mut C> {
        self.slot(entity).map(move |slot| &mut self.dense[slot])
    }

    /// Number of stored components.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    /// Returns `true` if nothing is stored.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// Returns a slice of all components (dense order, not entity order).
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[C] {
        &self.dense
    }

    /// Iterates over `(owner, component)` pairs in dense order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &C)> {
        self.owners.iter().copied().zip(self.dense.iter())
    }
}

impl<C: Component> AnyStorage for ComponentStorage<C> {
    fn remove_entity(&mut self, entity: EntityId) -> bool {
        self.remove(entity).is_some()
    }

    fn clear(&mut self) {
        for owner in &self.owners {
            self.sparse[owner.index() as usize] = VACANT;
        }
        self.owners.clear();
        self.dense.clear();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq)]
    struct Health(u32);

    impl Component for Health {
        const NAME: &'static str = "Health";
    }

    #[test]
    fn test_insert_get() {
        let mut storage: ComponentStorage<Health> = ComponentStorage::new(16);
        let e = EntityId::new(3, 1);

        assert!(storage.insert(e, Health(10)).is_none());
        assert_eq!(storage.get(e), Some(&Health(10)));
        assert_eq!(storage.insert(e, Health(7)), Some(Health(10)));
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn test_swap_remove_keeps_mapping() {
        let mut storage: ComponentStorage<Health> = ComponentStorage::new(16);
        let a = EntityId::new(0, 1);
        let b = EntityId::new(1, 1);
        let c = EntityId::new(2, 1);
        storage.insert(a, Health(1));
        storage.insert(b, Health(2));
        storage.insert(c, Health(3));

        assert_eq!(storage.remove(a), Some(Health(1)));
        assert_eq!(storage.get(c), Some(&Health(3)));
        assert_eq!(storage.get(b), Some(&Health(2)));
        assert!(storage.get(a).is_none());
        assert_eq!(storage.len(), 2);
    }

    #[test]
    fn test_stale_generation_is_rejected() {
        let mut storage: ComponentStorage<Health> = ComponentStorage::new(4);
        storage.insert(EntityId::new(0, 2), Health(5));

        assert!(storage.get(EntityId::new(0, 1)).is_none());
    }

    #[test]
    fn test_clear() {
        let mut storage: ComponentStorage<Health> = ComponentStorage::new(4);
        let e = EntityId::new(1, 1);
        storage.insert(e, Health(5));
        AnyStorage::clear(&mut storage);

        assert!(storage.is_empty());
        assert!(storage.get(e).is_none());
    }
}
