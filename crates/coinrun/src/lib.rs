//! # CoinRun
//!
//! Procedurally generated side-scrolling platformer, packaged as a
//! reinforcement-learning environment.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                          CoinRunEnv                               │
//! │   make / reset / step / render / close                            │
//! ├───────────────────────────────────────────────────────────────────┤
//! │                          Simulation                               │
//! │                                                                   │
//! │  ┌────────────────┐   ┌────────────────┐   ┌────────────────────┐ │
//! │  │ coinrun_core   │   │ coinrun_       │   │ systems            │ │
//! │  │                │   │ procedural     │   │                    │ │
//! │  │ • Registry     │──>│ • Tilemap      │──>│ • Agent / physics  │ │
//! │  │ • Signatures   │   │ • Generator    │   │ • Mob AI           │ │
//! │  │ • Pool         │   │ • Reachability │   │ • Hazard / Goal    │ │
//! │  └────────────────┘   └────────────────┘   │ • Particles        │ │
//! │                                            │ • Sprites          │ │
//! │                                            └─────────┬──────────┘ │
//! │                                                      v            │
//! │                                      render: SoftwareSurface      │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `action`: discrete action table
//! - `components`: plain-data components
//! - `config`: TOML-loadable configuration
//! - `env`: the public environment surface
//! - `physics`: tile collision and movement tuning
//! - `render`: software rasteriser, camera and palettes
//! - `simulation`: per-episode world and reset order
//! - `systems`: behaviour over matching entities

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod action;
pub mod components;
pub mod config;
pub mod env;
pub mod error;
pub mod physics;
pub mod render;
pub mod simulation;
pub mod systems;

pub use action::{Intent, ACTION_COUNT};
pub use config::EnvConfig;
pub use env::{BoxSpace, CoinRunEnv, DiscreteSpace, EnvOptions, Spaces, StepResult};
pub use error::{EnvError, EnvResult};
pub use physics::{PhysicsConfig, COLLISION_EPSILON};
pub use simulation::Simulation;
pub use systems::StepOutcome;
