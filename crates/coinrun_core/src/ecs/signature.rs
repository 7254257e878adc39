//! # Signatures
//!
//! A signature is a fixed-size set of component-type flags. Entities carry
//! one describing what they own; systems carry one describing what they
//! require. An entity belongs to a system exactly when its signature is a
//! superset of the system's.

use super::component::ComponentType;

/// Bitset of component types (up to 64).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Signature(u64);

impl Signature {
    /// The empty signature.
    pub const EMPTY: Self = Self(0);

    /// Builder-style insert.
    #[inline]
    #[must_use]
    pub const fn with(self, component: ComponentType) -> Self {
        Self(self.0 | (1 << component.index()))
    }

    /// Sets the flag for a component type.
    #[inline]
    pub fn set(&mut self, component: ComponentType) {
        self.0 |= 1 << component.index();
    }

    /// Clears the flag for a component type.
    #[inline]
    pub fn reset(&mut self, component: ComponentType) {
        self.0 &= !(1 << component.index());
    }

    /// Checks if a component type is present.
    #[inline]
    #[must_use]
    pub const fn contains(self, component: ComponentType) -> bool {
        (self.0 & (1 << component.index())) != 0
    }

    /// Checks if every flag of `required` is also set here.
    #[inline]
    #[must_use]
    pub const fn contains_all(self, required: Self) -> bool {
        (self.0 & required.0) == required.0
    }

    /// Returns `true` if no flags are set.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of component types in the set.
    #[inline]
    #[must_use]
    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }

    /// Raw bits.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u64 {
        self.0
    }
}

impl FromIterator<ComponentType> for Signature {
    fn from_iter<I: IntoIterator<Item = ComponentType>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, Self::with)
    }
}
