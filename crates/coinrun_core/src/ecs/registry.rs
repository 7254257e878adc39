//! # Registry
//!
//! The central container for entities, component storages and system
//! membership sets.
//!
//! Entity slots are pre-allocated at creation and recycled through a free
//! list, with a generation counter bumped on every spawn so stale handles
//! are rejected. Every `add_component`/`remove_component` recomputes the
//! entity's membership in each system whose signature has been set.

use std::any::TypeId;
use std::collections::{BTreeSet, HashMap};

use super::component::{Component, ComponentType, MAX_COMPONENTS};
use super::entity::{EntityId, EntitySlot};
use super::error::{EcsError, EcsResult};
use super::signature::Signature;
use super::storage::{AnyStorage, ComponentStorage};
use super::system::{System, SystemHandle};

/// Membership bookkeeping for one registered system.
struct SystemSlot {
    name: &'static str,
    signature: Option<Signature>,
    /// Ordered by entity index so iteration order is reproducible.
    members: BTreeSet<EntityId>,
}

/// Registry of entities, components and system membership.
///
/// # Capacity
///
/// The registry has a fixed entity capacity set at creation.
/// [`create_entity`](Self::create_entity) fails with
/// [`EcsError::CapacityExhausted`] once every slot is in use.
///
/// # Example
///
/// ```rust,ignore
/// let mut registry = Registry::new(256);
/// registry.register_component::<Transform>()?;
///
/// let e = registry.create_entity()?;
/// registry.add_component(e, Transform::at(1.0, 2.0))?;
/// ```
pub struct Registry {
    /// All entity slots (pre-allocated).
    slots: Box<[EntitySlot]>,
    /// Free list of entity indices for reuse.
    free_indices: Vec<u32>,
    /// Number of currently alive entities.
    alive_count: usize,
    capacity: usize,

    // =========================================================================
    // Components
    // =========================================================================
    component_types: HashMap<TypeId, ComponentType>,
    /// Indexed by `ComponentType::index()`.
    storages: Vec<Box<dyn AnyStorage>>,

    // =========================================================================
    // Systems
    // =========================================================================
    system_handles: HashMap<TypeId, SystemHandle>,
    systems: Vec<SystemSlot>,
    /// Set once systems start iterating; signatures are frozen afterwards.
    sealed: bool,
}

impl Registry {
    /// Creates a registry able to hold `capacity` live entities.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero or exceeds `u32::MAX`.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");
        assert!(
            capacity <= u32::MAX as usize,
            "Capacity cannot exceed u32::MAX"
        );

        let slots = (0..capacity as u32)
            .map(EntitySlot::dead)
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Self {
            slots,
            free_indices: Self::fresh_free_list(capacity),
            alive_count: 0,
            capacity,
            component_types: HashMap::new(),
            storages: Vec::with_capacity(MAX_COMPONENTS),
            system_handles: HashMap::new(),
            systems: Vec::new(),
            sealed: false,
        }
    }

    /// Lowest index is popped first.
    fn fresh_free_list(capacity: usize) -> Vec<u32> {
        (0..capacity as u32).rev().collect()
    }

    /// Returns the maximum number of live entities.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of currently alive entities.
    #[inline]
    #[must_use]
    pub const fn alive_count(&self) -> usize {
        self.alive_count
    }

    // =========================================================================
    // Entities
    // =========================================================================

    /// Creates a new entity with no components.
    ///
    /// # Errors
    ///
    /// [`EcsError::CapacityExhausted`] if every slot is in use.
    pub fn create_entity(&mut self) -> EcsResult<EntityId> {
        let Some(index) = self.free_indices.pop() else {
            return Err(EcsError::CapacityExhausted {
                capacity: self.capacity,
            });
        };

        let slot = &mut self.slots[index as usize];
        let generation = slot.id.generation().wrapping_add(1);
        let id = EntityId::new(index, generation);

        *slot = EntitySlot::new(id);
        self.alive_count += 1;

        Ok(id)
    }

    /// Destroys an entity, detaching all of its components and removing it
    /// from every system set.
    ///
    /// Returns `false` if the entity was already dead or the id is stale.
    pub fn destroy_entity(&mut self, id: EntityId) -> bool {
        if !self.is_alive(id) {
            return false;
        }

        let idx = id.index() as usize;
        let signature = self.slots[idx].signature;

        for (bit, storage) in self.storages.iter_mut().enumerate() {
            if signature.bits() & (1 << bit) != 0 {
                storage.remove_entity(id);
            }
        }
        for system in &mut self.systems {
            system.members.remove(&id);
        }

        let slot = &mut self.slots[idx];
        slot.alive = false;
        slot.signature = Signature::EMPTY;
        self.alive_count -= 1;
        self.free_indices.push(id.index());

        true
    }

    /// Destroys every entity.
    ///
    /// Generations are preserved so old handles stay invalid, but the free
    /// list is rebuilt so the next spawns reuse indices from zero upward.
    pub fn clear_entities(&mut self) {
        for storage in &mut self.storages {
            storage.clear();
        }
        for system in &mut self.systems {
            system.members.clear();
        }
        for slot in self.slots.iter_mut() {
            slot.alive = false;
            slot.signature = Signature::EMPTY;
        }

        self.free_indices = Self::fresh_free_list(self.capacity);
        self.alive_count = 0;
    }

    /// Checks if an entity is alive.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, id: EntityId) -> bool {
        if id.is_null() {
            return false;
        }
        self.slots
            .get(id.index() as usize)
            .is_some_and(|slot| slot.alive && slot.id == id)
    }

    /// Returns the component signature of a live entity.
    #[must_use]
    pub fn entity_signature(&self, id: EntityId) -> Option<Signature> {
        self.is_alive(id)
            .then(|| self.slots[id.index() as usize].signature)
    }

    /// Iterates over all alive entities in index order.
    pub fn iter_alive(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.slots.iter().filter(|s| s.alive).map(|s| s.id)
    }

    fn ensure_alive(&self, id: EntityId) -> EcsResult<()> {
        if self.is_alive(id) {
            Ok(())
        } else {
            Err(EcsError::EntityNotAlive { entity: id })
        }
    }

    // =========================================================================
    // Components
    // =========================================================================

    /// Registers a component type, allocating its storage.
    ///
    /// # Errors
    ///
    /// - [`EcsError::ComponentAlreadyRegistered`] on a second call for `T`
    /// - [`EcsError::TooManyComponents`] past [`MAX_COMPONENTS`] types
    pub fn register_component<T: Component>(&mut self) -> EcsResult<ComponentType> {
        let key = TypeId::of::<T>();
        if self.component_types.contains_key(&key) {
            return Err(EcsError::ComponentAlreadyRegistered { name: T::NAME });
        }

        let ty = u8::try_from(self.storages.len())
            .ok()
            .and_then(ComponentType::new)
            .ok_or(EcsError::TooManyComponents { name: T::NAME })?;

        self.storages
            .push(Box::new(ComponentStorage::<T>::new(self.capacity)));
        self.component_types.insert(key, ty);

        tracing::trace!(component = T::NAME, id = %ty, "component registered");
        Ok(ty)
    }

    /// Looks up the runtime type id of a registered component.
    ///
    /// # Errors
    ///
    /// [`EcsError::ComponentNotRegistered`] if `T` was never registered.
    pub fn component_type<T: Component>(&self) -> EcsResult<ComponentType> {
        self.component_types
            .get(&TypeId::of::<T>())
            .copied()
            .ok_or(EcsError::ComponentNotRegistered { name: T::NAME })
    }

    /// Returns the typed storage for `T`.
    ///
    /// # Errors
    ///
    /// [`EcsError::ComponentNotRegistered`] if `T` was never registered.
    pub fn storage<T: Component>(&self) -> EcsResult<&ComponentStorage<T>> {
        let ty = self.component_type::<T>()?;
        self.storages[ty.index() as usize]
            .as_any()
            .downcast_ref::<ComponentStorage<T>>()
            .ok_or(EcsError::ComponentNotRegistered { name: T::NAME })
    }

    fn storage_mut<T: Component>(&mut self) -> EcsResult<(ComponentType, &mut ComponentStorage<T>)> {
        let ty = self.component_type::<T>()?;
        let storage = self.storages[ty.index() as usize]
            .as_any_mut()
            .downcast_mut::<ComponentStorage<T>>()
            .ok_or(EcsError::ComponentNotRegistered { name: T::NAME })?;
        Ok((ty, storage))
    }

    /// Attaches a component to a live entity.
    ///
    /// # Errors
    ///
    /// - [`EcsError::ComponentNotRegistered`]
    /// - [`EcsError::EntityNotAlive`]
    /// - [`EcsError::DuplicateComponent`] if the entity already has one
    pub fn add_component<T: Component>(&mut self, id: EntityId, component: T) -> EcsResult<()> {
        self.component_type::<T>()?;
        self.ensure_alive(id)?;

        let (ty, storage) = self.storage_mut::<T>()?;
        if storage.get(id).is_some() {
            return Err(EcsError::DuplicateComponent {
                entity: id,
                name: T::NAME,
            });
        }
        storage.insert(id, component);

        let slot = &mut self.slots[id.index() as usize];
        slot.signature.set(ty);
        let signature = slot.signature;
        self.refresh_membership(id, signature);
        Ok(())
    }

    /// Detaches and returns a component.
    ///
    /// # Errors
    ///
    /// - [`EcsError::ComponentNotRegistered`]
    /// - [`EcsError::EntityNotAlive`]
    /// - [`EcsError::MissingComponent`]
    pub fn remove_component<T: Component>(&mut self, id: EntityId) -> EcsResult<T> {
        self.component_type::<T>()?;
        self.ensure_alive(id)?;

        let (ty, storage) = self.storage_mut::<T>()?;
        let value = storage.remove(id).ok_or(EcsError::MissingComponent {
            entity: id,
            name: T::NAME,
        })?;

        let slot = &mut self.slots[id.index() as usize];
        slot.signature.reset(ty);
        let signature = slot.signature;
        self.refresh_membership(id, signature);
        Ok(value)
    }

    /// Gets a component of a live entity.
    ///
    /// # Errors
    ///
    /// - [`EcsError::ComponentNotRegistered`]
    /// - [`EcsError::EntityNotAlive`]
    /// - [`EcsError::MissingComponent`]
    pub fn get<T: Component>(&self, id: EntityId) -> EcsResult<&T> {
        let storage = self.storage::<T>()?;
        self.ensure_alive(id)?;
        storage.get(id).ok_or(EcsError::MissingComponent {
            entity: id,
            name: T::NAME,
        })
    }

    /// Gets a component of a live entity mutably.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub fn get_mut<T: Component>(&mut self, id: EntityId) -> EcsResult<&mut T> {
        self.ensure_alive(id)?;
        let (_, storage) = self.storage_mut::<T>()?;
        storage.get_mut(id).ok_or(EcsError::MissingComponent {
            entity: id,
            name: T::NAME,
        })
    }

    /// Returns `true` if `id` is alive and owns a `T`.
    ///
    /// Unregistered component types are simply not present.
    #[must_use]
    pub fn has<T: Component>(&self, id: EntityId) -> bool {
        match (self.component_type::<T>(), self.entity_signature(id)) {
            (Ok(ty), Some(signature)) => signature.contains(ty),
            _ => false,
        }
    }

    // =========================================================================
    // Systems
    // =========================================================================

    /// Registers a system type and returns its handle.
    ///
    /// # Errors
    ///
    /// [`EcsError::SystemAlreadyRegistered`] on a second call for `S`.
    pub fn register_system<S: System>(&mut self) -> EcsResult<SystemHandle> {
        let key = TypeId::of::<S>();
        if self.system_handles.contains_key(&key) {
            return Err(EcsError::SystemAlreadyRegistered { name: S::NAME });
        }

        let handle = SystemHandle::new(self.systems.len() as u32);
        self.systems.push(SystemSlot {
            name: S::NAME,
            signature: None,
            members: BTreeSet::new(),
        });
        self.system_handles.insert(key, handle);

        tracing::trace!(system = S::NAME, handle = %handle, "system registered");
        Ok(handle)
    }

    /// Returns the handle of a registered system.
    ///
    /// # Errors
    ///
    /// [`EcsError::SystemNotRegistered`] if `S` was never registered.
    pub fn system_handle<S: System>(&self) -> EcsResult<SystemHandle> {
        self.system_handles
            .get(&TypeId::of::<S>())
            .copied()
            .ok_or(EcsError::SystemNotRegistered { name: S::NAME })
    }

    /// Sets the required component set of a system.
    ///
    /// May be called once per system and only before [`seal`](Self::seal).
    /// Entities already alive are sorted into the system immediately.
    ///
    /// # Errors
    ///
    /// - [`EcsError::SystemNotRegistered`]
    /// - [`EcsError::SignatureLocked`] after `seal`
    /// - [`EcsError::SignatureAlreadySet`] on a second call
    pub fn set_system_signature<S: System>(&mut self, signature: Signature) -> EcsResult<()> {
        let handle = self.system_handle::<S>()?;
        if self.sealed {
            return Err(EcsError::SignatureLocked { name: S::NAME });
        }

        let system = &mut self.systems[handle.index() as usize];
        if system.signature.is_some() {
            return Err(EcsError::SignatureAlreadySet { name: S::NAME });
        }
        system.signature = Some(signature);
        system.members = self
            .slots
            .iter()
            .filter(|s| s.alive && s.signature.contains_all(signature))
            .map(|s| s.id)
            .collect();

        tracing::debug!(
            system = S::NAME,
            components = signature.len(),
            "system signature set"
        );
        Ok(())
    }

    /// Returns a system's signature, if set.
    #[must_use]
    pub fn system_signature(&self, handle: SystemHandle) -> Option<Signature> {
        self.systems
            .get(handle.index() as usize)
            .and_then(|s| s.signature)
    }

    /// Freezes all system signatures.
    pub fn seal(&mut self) {
        if !self.sealed {
            self.sealed = true;
            tracing::debug!(systems = self.systems.len(), "registry sealed");
        }
    }

    /// Returns `true` once [`seal`](Self::seal) has been called.
    #[inline]
    #[must_use]
    pub const fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Iterates over the members of a system in ascending index order.
    ///
    /// An unknown handle or unset signature yields nothing.
    pub fn system_entities(&self, handle: SystemHandle) -> impl Iterator<Item = EntityId> + '_ {
        self.systems
            .get(handle.index() as usize)
            .into_iter()
            .flat_map(|s| s.members.iter().copied())
    }

    /// Copies the members of a system into `out` (cleared first).
    ///
    /// Lets a system mutate the registry while walking its own member list
    /// without allocating per step.
    pub fn copy_system_entities(&self, handle: SystemHandle, out: &mut Vec<EntityId>) {
        out.clear();
        out.extend(self.system_entities(handle));
    }

    /// Number of entities in a system's set.
    #[must_use]
    pub fn system_len(&self, handle: SystemHandle) -> usize {
        self.systems
            .get(handle.index() as usize)
            .map_or(0, |s| s.members.len())
    }

    /// Name a system registered under, for diagnostics.
    #[must_use]
    pub fn system_name(&self, handle: SystemHandle) -> Option<&'static str> {
        self.systems.get(handle.index() as usize).map(|s| s.name)
    }

    fn refresh_membership(&mut self, id: EntityId, signature: Signature) {
        for system in &mut self.systems {
            let Some(required) = system.signature else {
                continue;
            };
            if signature.contains_all(required) {
                system.members.insert(id);
            } else {
                system.members.remove(&id);
            }
        }
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("capacity", &self.capacity)
            .field("alive", &self.alive_count)
            .field("components", &self.storages.len())
            .field("systems", &self.systems.len())
            .field("sealed", &self.sealed)
            .finish()
    }
}
