//! # Generator Configuration
//!
//! Every tuning constant of level generation. Deserialisable so it can be
//! embedded in an environment config file; every field has a default.

use serde::{Deserialize, Serialize};

use crate::error::{GenerationError, GenerationResult};

/// The agent's reach, in whole tiles.
///
/// The generator only builds transitions inside this arc, and the
/// reachability check only follows jumps inside it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JumpArc {
    /// Highest ledge (in rows above the take-off stand) a jump can land on.
    pub max_rise: u32,
    /// Largest horizontal stand-to-stand distance of a jump, in columns.
    pub max_span: u32,
}

impl Default for JumpArc {
    fn default() -> Self {
        Self {
            max_rise: 2,
            max_span: 4,
        }
    }
}

/// Level generation parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Grid width in tiles, including the two boundary columns.
    pub width: u32,
    /// Grid height in tiles, including the floor row.
    pub height: u32,
    /// Number of wall themes to choose from.
    pub theme_count: u32,
    /// Chance per interior platform column of a crate stack.
    pub obstacle_density: f32,
    /// Shortest gap, in columns.
    pub gap_min: u32,
    /// Longest gap, in columns.
    pub gap_max: u32,
    /// Shortest platform segment, in columns.
    pub segment_min: u32,
    /// Longest platform segment, in columns.
    pub segment_max: u32,
    /// Highest platform elevation above the floor row.
    pub max_elevation: u32,
    /// Largest drop between neighbouring segments.
    pub max_step_down: u32,
    /// Chance a gap gets a lava floor.
    pub hazard_pit_chance: f32,
    /// Chance an interior segment gets a patrolling mob.
    pub mob_chance: f32,
    /// Chance per platform stand of a decoration.
    pub decor_density: f32,
    /// Columns right of the spawn kept free of hazards and obstacles.
    pub spawn_safe_radius: u32,
    /// Agent reach.
    pub jump: JumpArc,
    /// Redraws allowed before giving up.
    pub max_attempts: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            width: 64,
            height: 16,
            theme_count: 4,
            obstacle_density: 0.12,
            gap_min: 1,
            gap_max: 3,
            segment_min: 3,
            segment_max: 8,
            max_elevation: 6,
            max_step_down: 3,
            hazard_pit_chance: 0.5,
            mob_chance: 0.3,
            decor_density: 0.08,
            spawn_safe_radius: 4,
            jump: JumpArc::default(),
            max_attempts: 32,
        }
    }
}

impl GeneratorConfig {
    /// Checks that the parameters can produce a level at all.
    ///
    /// # Errors
    ///
    /// [`GenerationError::InvalidConfig`] naming the first bad parameter.
    pub fn validate(&self) -> GenerationResult<()> {
        fn fail(msg: impl Into<String>) -> GenerationResult<()> {
            Err(GenerationError::InvalidConfig(msg.into()))
        }

        if self.theme_count == 0 {
            return fail("theme_count must be at least 1");
        }
        if self.jump.max_rise == 0 || self.jump.max_span < 2 {
            return fail("jump arc must allow a rise of 1 and a span of 2");
        }
        if self.gap_min == 0 || self.gap_min > self.gap_max {
            return fail(format!(
                "gap bounds {}..={} are empty",
                self.gap_min, self.gap_max
            ));
        }
        if self.gap_max + 1 > self.jump.max_span {
            return fail(format!(
                "gap_max {} cannot be cleared with a jump span of {}",
                self.gap_max, self.jump.max_span
            ));
        }
        if self.segment_min < 3 || self.segment_min > self.segment_max {
            return fail(format!(
                "segment bounds {}..={} must be non-empty and start at 3 or more",
                self.segment_min, self.segment_max
            ));
        }
        if self.max_elevation == 0 || self.max_step_down == 0 {
            return fail("max_elevation and max_step_down must be at least 1");
        }
        if self.height < self.max_elevation + self.jump.max_rise + 4 {
            return fail(format!(
                "height {} leaves no headroom above elevation {}",
                self.height, self.max_elevation
            ));
        }
        let spawn_run = self.spawn_safe_radius.max(self.segment_min) + 1;
        if self.width < spawn_run + self.segment_min + 2 {
            return fail(format!("width {} is too narrow", self.width));
        }
        for (name, p) in [
            ("obstacle_density", self.obstacle_density),
            ("hazard_pit_chance", self.hazard_pit_chance),
            ("mob_chance", self.mob_chance),
            ("decor_density", self.decor_density),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return fail(format!("{name} must be within [0, 1], got {p}"));
            }
        }
        if self.max_attempts == 0 {
            return fail("max_attempts must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        GeneratorConfig::default().validate().unwrap();
    }

    #[test]
    fn test_gap_wider_than_jump_is_rejected() {
        let config = GeneratorConfig {
            gap_max: 4,
            ..GeneratorConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(GenerationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_probability_range() {
        let config = GeneratorConfig {
            mob_chance: 1.5,
            ..GeneratorConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("mob_chance"));
    }
}
