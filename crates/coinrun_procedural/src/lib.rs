//! # CoinRun Procedural Generation
//!
//! Deterministic level generation for the CoinRun platformer.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: the same RNG stream always produces the same level
//! 2. **Solvable**: every level returned passes a reachability check
//! 3. **Configurable**: every tuning constant lives in [`GeneratorConfig`]
//!
//! ## Core Components
//!
//! - `Tile` / `Tilemap`: the static level grid and its terrain queries
//! - `LevelGenerator`: segments, gaps, obstacles, mobs and the goal
//! - `reachability`: breadth-first search over stand cells
//!
//! ## Example
//!
//! ```rust,ignore
//! use coinrun_procedural::{GeneratorConfig, LevelGenerator};
//! use rand::SeedableRng;
//!
//! let generator = LevelGenerator::new(GeneratorConfig::default())?;
//! let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(42);
//! let level = generator.generate(&mut rng)?;
//!
//! assert!(level.tilemap.is_stand(level.spawn.x, level.spawn.y));
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod generator;
pub mod reachability;
pub mod tile;
pub mod tilemap;

pub use config::{GeneratorConfig, JumpArc};
pub use error::{GenerationError, GenerationResult};
pub use generator::{Level, LevelGenerator, MobSpawn};
pub use reachability::{is_reachable, reachable_stands, StandSet};
pub use tile::{Cell, Tile, DECOR_VARIANTS};
pub use tilemap::Tilemap;
