//! # Component System
//!
//! Components are pure data containers with no behavior.
//! They must be `Copy` so systems can read, modify and write them back
//! without holding borrows into the registry.

use std::fmt;

/// Maximum number of distinct component types (one bit each in a signature).
pub const MAX_COMPONENTS: usize = 64;

/// Marker trait for ECS components.
///
/// Components must be:
/// - `Copy`: No heap allocations, bitwise copyable
/// - `Send + Sync`: An environment may be moved to a worker thread
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Clone, Copy, Debug, Default)]
/// struct Position {
///     x: f32,
///     y: f32,
/// }
///
/// impl Component for Position {
///     const NAME: &'static str = "Position";
/// }
/// ```
pub trait Component: Copy + Send + Sync + 'static {
    /// Human-readable name for diagnostics.
    const NAME: &'static str;
}

/// Runtime identifier of a registered component type (0-63).
///
/// Assigned in registration order; doubles as the bit position in a
/// [`Signature`](super::Signature).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentType(u8);

impl ComponentType {
    /// Creates a component type from its bit index.
    ///
    /// Returns `None` if the index does not fit in a signature.
    #[inline]
    #[must_use]
    pub const fn new(index: u8) -> Option<Self> {
        if (index as usize) < MAX_COMPONENTS {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Returns the bit index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u8 {
        self.0
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_type_bounds() {
        assert!(ComponentType::new(0).is_some());
        assert!(ComponentType::new(63).is_some());
        assert!(ComponentType::new(64).is_none());
    }
}
