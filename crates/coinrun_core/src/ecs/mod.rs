//! # Entity Component System
//!
//! A signature-driven ECS sized for one environment instance.
//!
//! ## Design Philosophy
//!
//! - Entity slots are pre-allocated at registry creation
//! - Components are stored in dense arrays, one per type
//! - Entity IDs are indices with generation counters
//! - Systems declare a required component set once; membership is kept
//!   current on every attach/detach

mod component;
mod entity;
mod error;
mod registry;
mod signature;
mod storage;
mod system;

pub use component::{Component, ComponentType, MAX_COMPONENTS};
pub use entity::EntityId;
pub use error::{EcsError, EcsResult};
pub use registry::Registry;
pub use signature::Signature;
pub use storage::ComponentStorage;
pub use system::{System, SystemHandle};
