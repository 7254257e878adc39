//! # Systems
//!
//! Each system registers with the [`Registry`](coinrun_core::Registry),
//! declares the components it requires, and iterates whatever entities the
//! registry says match. Systems are owned by the
//! [`Simulation`](crate::Simulation) and borrow the registry only while
//! they run.
//!
//! | System               | Requires                                   |
//! |----------------------|--------------------------------------------|
//! | `SpriteRenderSystem` | Sprite, Transform, Collision               |
//! | `MobAiSystem`        | MobAi, Transform, Collision                |
//! | `HazardSystem`       | Hazard, Transform, Collision               |
//! | `GoalSystem`         | Goal, Transform, Collision                 |
//! | `AgentSystem`        | Agent, Transform, Collision, Dynamics      |
//! | `ParticleSystem`     | Particles, Transform                       |

mod agent;
mod goal;
mod hazard;
mod mob_ai;
mod particles;
mod sprite_render;

pub use agent::{AgentSystem, StepOutcome};
pub use goal::GoalSystem;
pub use hazard::HazardSystem;
pub use mob_ai::{MobAiSystem, MOB_SIZE};
pub use particles::{BurstConfig, Particle, ParticleSystem};
pub use sprite_render::SpriteRenderSystem;
