//! # Entity Management
//!
//! Entities are lightweight identifiers consisting of:
//! - An index into the registry's slot table
//! - A generation counter for safe reuse

use super::signature::Signature;

/// Unique identifier for an entity.
///
/// The ID is split into two parts:
/// - Lower 32 bits: Index into the slot table
/// - Upper 32 bits: Generation counter for detecting stale references
///
/// Ordering is by index first, so sorted sets of ids iterate in slot order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Null/invalid entity ID.
    pub const NULL: Self = Self(u64::MAX);

    /// Creates a new entity ID from index and generation.
    #[inline]
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self(((generation as u64) << 32) | (index as u64))
    }

    /// Returns the index portion of the entity ID.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0 as u32
    }

    /// Returns the generation portion of the entity ID.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Checks if this entity ID is null/invalid.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == u64::MAX
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::NULL
    }
}

impl PartialOrd for EntityId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EntityId {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.index(), self.generation()).cmp(&(other.index(), other.generation()))
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}v{}", self.index(), self.generation())
    }
}

/// A slot in the registry's entity table.
///
/// Tracks which components are attached via a signature bitmask.
#[derive(Clone, Copy, Debug)]
pub(crate) struct EntitySlot {
    /// The identifier currently (or last) occupying this slot.
    pub id: EntityId,
    /// Attached component types.
    pub signature: Signature,
    /// Whether this slot is currently alive.
    pub alive: bool,
}

impl EntitySlot {
    /// Creates a live slot with no components.
    #[inline]
    pub const fn new(id: EntityId) -> Self {
        Self {
            id,
            signature: Signature::EMPTY,
            alive: true,
        }
    }

    /// Creates a dead/empty slot at the given index.
    ///
    /// The generation starts at zero and is bumped on first spawn.
    #[inline]
    pub const fn dead(index: u32) -> Self {
        Self {
            id: EntityId::new(index, 0),
            signature: Signature::EMPTY,
            alive: false,
        }
    }
}
