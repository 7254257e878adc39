//! # Environment Configuration
//!
//! Loaded once at startup, from TOML or from defaults. Every field has a
//! default, so a config file only needs the values it changes:
//!
//! ```toml
//! obs_width = 96
//! obs_height = 96
//!
//! [physics]
//! max_speed = 8.0
//!
//! [generator]
//! width = 96
//! mob_chance = 0.5
//! ```

use std::path::Path;

use coinrun_procedural::GeneratorConfig;
use serde::{Deserialize, Serialize};

use crate::error::{EnvError, EnvResult};
use crate::physics::PhysicsConfig;
use crate::render::palette::{AGENT_THEMES, BACKGROUND_LIMIT, WALL_THEMES};

/// Entities alive besides mobs: the agent and the goal.
const FIXED_ENTITIES: u32 = 2;

/// Environment parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    /// Observation width in pixels.
    pub obs_width: u32,
    /// Observation height in pixels.
    pub obs_height: u32,
    /// Full-size frame width in pixels.
    pub render_width: u32,
    /// Full-size frame height in pixels.
    pub render_height: u32,
    /// Simulated seconds per step.
    pub dt: f32,
    /// Tiles visible across the frame.
    pub view_tiles: f32,
    /// Reward for reaching the goal.
    pub goal_reward: f32,
    /// Registry capacity.
    pub entity_capacity: u32,
    /// Particle pool capacity.
    pub particle_capacity: u32,
    /// Particles per landing or jump burst.
    pub dust_burst: u16,
    /// Seconds a particle lives.
    pub particle_lifetime: f32,
    /// Number of backgrounds to choose from.
    pub background_count: u32,
    /// Number of agent themes to choose from.
    pub agent_theme_count: u32,
    /// Mob patrol speed, tiles per second.
    pub mob_speed: f32,
    /// Movement tuning.
    pub physics: PhysicsConfig,
    /// Level generation.
    pub generator: GeneratorConfig,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            obs_width: 64,
            obs_height: 64,
            render_width: 800,
            render_height: 800,
            dt: 0.05,
            view_tiles: 14.0,
            goal_reward: 10.0,
            entity_capacity: 256,
            particle_capacity: 256,
            dust_burst: 6,
            particle_lifetime: 0.4,
            background_count: 48,
            agent_theme_count: 4,
            mob_speed: 1.5,
            physics: PhysicsConfig::default(),
            generator: GeneratorConfig::default(),
        }
    }
}

impl EnvConfig {
    /// Parses a TOML document. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// [`EnvError::ConfigParse`] on malformed TOML or mistyped fields.
    pub fn from_toml_str(text: &str) -> EnvResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// [`EnvError::Io`] if the file cannot be read, otherwise as
    /// [`EnvConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> EnvResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.as_ref().display(), "loaded environment config");
        Ok(config)
    }

    /// Checks every parameter the environment depends on.
    ///
    /// # Errors
    ///
    /// [`EnvError::InvalidConfig`] naming the first bad parameter, or
    /// [`EnvError::Generation`] if the generator config is unusable.
    pub fn validate(&self) -> EnvResult<()> {
        fn fail(msg: impl Into<String>) -> EnvResult<()> {
            Err(EnvError::InvalidConfig(msg.into()))
        }

        if self.obs_width == 0 || self.obs_height == 0 {
            return fail("observation size must be non-zero");
        }
        if self.render_width == 0 || self.render_height == 0 {
            return fail("render size must be non-zero");
        }
        if !(self.dt > 0.0 && self.dt <= 0.5) {
            return fail(format!("dt must be within (0, 0.5], got {}", self.dt));
        }
        if !(self.view_tiles.is_finite() && self.view_tiles > 0.0) {
            return fail(format!("view_tiles must be positive, got {}", self.view_tiles));
        }
        if !(self.goal_reward.is_finite() && self.goal_reward > 0.0) {
            return fail(format!("goal_reward must be positive, got {}", self.goal_reward));
        }
        if self.particle_capacity == 0 {
            return fail("particle_capacity must be at least 1");
        }
        if !(self.particle_lifetime.is_finite() && self.particle_lifetime > 0.0) {
            return fail("particle_lifetime must be positive");
        }
        if !(self.mob_speed.is_finite() && self.mob_speed >= 0.0) {
            return fail("mob_speed must be non-negative");
        }

        self.generator.validate()?;

        // Every interior segment can hold one mob, and segments are at
        // least `segment_min` columns wide.
        let max_mobs = self.generator.width / self.generator.segment_min;
        if self.entity_capacity < FIXED_ENTITIES + max_mobs {
            return fail(format!(
                "entity_capacity {} cannot hold {} mobs plus agent and goal",
                self.entity_capacity, max_mobs
            ));
        }

        if self.generator.theme_count as usize > WALL_THEMES.len() {
            return fail(format!(
                "generator.theme_count {} exceeds the {} wall palettes",
                self.generator.theme_count,
                WALL_THEMES.len()
            ));
        }
        if self.agent_theme_count == 0 || self.agent_theme_count as usize > AGENT_THEMES.len() {
            return fail(format!(
                "agent_theme_count must be within 1..={}, got {}",
                AGENT_THEMES.len(),
                self.agent_theme_count
            ));
        }
        if self.background_count == 0 || self.background_count > BACKGROUND_LIMIT {
            return fail(format!(
                "background_count must be within 1..={BACKGROUND_LIMIT}, got {}",
                self.background_count
            ));
        }

        self.physics.validate(self.dt, self.generator.jump)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        EnvConfig::default().validate().unwrap();
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EnvConfig::from_toml_str(
            r#"
            obs_width = 96
            [physics]
            max_speed = 8.0
            [generator]
            width = 80
            "#,
        )
        .unwrap();
        assert_eq!(config.obs_width, 96);
        assert_eq!(config.obs_height, 64);
        assert_eq!(config.physics.max_speed, 8.0);
        assert_eq!(config.physics.gravity, PhysicsConfig::default().gravity);
        assert_eq!(config.generator.width, 80);
        assert_eq!(config.generator.height, GeneratorConfig::default().height);
        config.validate().unwrap();
    }

    #[test]
    fn test_mistyped_field_is_parse_error() {
        let err = EnvConfig::from_toml_str("obs_width = \"wide\"").unwrap_err();
        assert!(matches!(err, EnvError::ConfigParse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = EnvConfig::load("/nonexistent/coinrun.toml").unwrap_err();
        assert!(matches!(err, EnvError::Io(_)));
    }

    #[test]
    fn test_theme_count_bounded_by_palette() {
        let mut config = EnvConfig::default();
        config.generator.theme_count = WALL_THEMES.len() as u32 + 1;
        assert!(matches!(config.validate(), Err(EnvError::InvalidConfig(_))));
    }

    #[test]
    fn test_generator_errors_pass_through() {
        let mut config = EnvConfig::default();
        config.generator.gap_max = 10;
        assert!(matches!(config.validate(), Err(EnvError::Generation(_))));
    }

    #[test]
    fn test_weak_jump_rejected() {
        let mut config = EnvConfig::default();
        config.physics.jump_velocity = 6.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("jump"), "{err}");
    }
}
