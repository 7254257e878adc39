//! # CoinRun Core
//!
//! Entity registry for the CoinRun simulation:
//! - Generational entity ids with slot recycling
//! - Dense per-type component storage
//! - Signature-filtered system membership
//!
//! ## Architecture Rules
//!
//! 1. **Components are plain data** - `Copy`, no behaviour
//! 2. **Systems are owned by the caller** - the registry only tracks who matches
//! 3. **Misuse is an error** - every registry mistake surfaces as [`EcsError`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use coinrun_core::{Registry, Signature};
//!
//! let mut registry = Registry::new(512);
//! let transform = registry.register_component::<Transform>()?;
//! let physics = registry.register_system::<PhysicsSystem>()?;
//! registry.set_system_signature::<PhysicsSystem>(Signature::EMPTY.with(transform))?;
//! registry.seal();
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod ecs;
pub mod memory;

pub use ecs::{
    Component, ComponentStorage, ComponentType, EcsError, EcsResult, EntityId, Registry,
    Signature, System, SystemHandle, MAX_COMPONENTS,
};
pub use memory::{PoolHandle, RecyclingPool};
