//! # Registry Error Types
//!
//! Every way the registry can be misused. These are programming errors:
//! callers are expected to treat them as fatal.

use thiserror::Error;

use super::entity::EntityId;

/// Errors raised by the [`Registry`](super::Registry).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// Component type used before `register_component`.
    #[error("component not registered: {name}")]
    ComponentNotRegistered {
        /// Component name.
        name: &'static str,
    },

    /// `register_component` called twice for the same type.
    #[error("component already registered: {name}")]
    ComponentAlreadyRegistered {
        /// Component name.
        name: &'static str,
    },

    /// More component types than fit in a signature
    /// ([`MAX_COMPONENTS`](super::MAX_COMPONENTS)).
    #[error("cannot register {name}: limit of 64 component types reached")]
    TooManyComponents {
        /// Component name.
        name: &'static str,
    },

    /// System used before `register_system`.
    #[error("system not registered: {name}")]
    SystemNotRegistered {
        /// System name.
        name: &'static str,
    },

    /// `register_system` called twice for the same type.
    #[error("system already registered: {name}")]
    SystemAlreadyRegistered {
        /// System name.
        name: &'static str,
    },

    /// `set_system_signature` called a second time.
    #[error("signature for system {name} is already set")]
    SignatureAlreadySet {
        /// System name.
        name: &'static str,
    },

    /// `set_system_signature` called after the registry was sealed.
    #[error("signature for system {name} cannot change after systems started iterating")]
    SignatureLocked {
        /// System name.
        name: &'static str,
    },

    /// Operation on a dead or stale entity.
    #[error("entity {entity} is not alive")]
    EntityNotAlive {
        /// The rejected id.
        entity: EntityId,
    },

    /// Entity lacks the requested component.
    #[error("entity {entity} has no {name} component")]
    MissingComponent {
        /// The entity.
        entity: EntityId,
        /// Component name.
        name: &'static str,
    },

    /// `add_component` on an entity that already owns that type.
    #[error("entity {entity} already has a {name} component")]
    DuplicateComponent {
        /// The entity.
        entity: EntityId,
        /// Component name.
        name: &'static str,
    },

    /// Every entity slot is in use.
    #[error("entity capacity of {capacity} exhausted")]
    CapacityExhausted {
        /// Registry capacity.
        capacity: usize,
    },
}

/// Result type for registry operations.
pub type EcsResult<T> = Result<T, EcsError>;
