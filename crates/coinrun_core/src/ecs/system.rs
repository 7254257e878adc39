//! # Systems
//!
//! A system is behaviour that runs over every entity matching its
//! signature. The registry only tracks *membership*; the system values
//! themselves are owned by the caller so they can borrow the registry
//! mutably while they run.

use std::fmt;

/// Marker trait for types that register with the [`Registry`](super::Registry).
pub trait System: 'static {
    /// Human-readable name for diagnostics.
    const NAME: &'static str;
}

/// Handle assigned to each registered system.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SystemHandle(u32);

impl SystemHandle {
    pub(crate) const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Return the raw index backing this handle.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for SystemHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
