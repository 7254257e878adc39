//! # Level Generator
//!
//! Builds one solvable level from an RNG stream.
//!
//! ## Algorithm
//!
//! 1. Solid floor row and boundary columns
//! 2. Platform segments left to right, joined by a step up, a step down,
//!    or a gap (optionally floored with lava), all inside the jump arc
//! 3. Crate stacks on interior segments, or a patrolling mob
//! 4. Goal stand on the rightmost column
//! 5. Reachability check; an unsolvable draw is redrawn from the same
//!    stream until the retry budget runs out
//! 6. Decorations on platform stands
//!
//! The RNG is never reseeded here, so a fixed seed always yields the same
//! sequence of levels.

use rand::Rng;

use crate::config::GeneratorConfig;
use crate::error::{GenerationError, GenerationResult};
use crate::reachability;
use crate::tile::{Cell, Tile, DECOR_VARIANTS};
use crate::tilemap::Tilemap;

/// Where a mob starts and the span it patrols.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MobSpawn {
    /// Starting stand.
    pub cell: Cell,
    /// Left edge of the patrol span, in world units.
    pub min_x: f32,
    /// Right edge of the patrol span, in world units.
    pub max_x: f32,
}

/// A generated level.
#[derive(Clone, Debug)]
pub struct Level {
    /// The grid, carrying the chosen wall theme.
    pub tilemap: Tilemap,
    /// Agent spawn stand.
    pub spawn: Cell,
    /// Goal stand.
    pub goal: Cell,
    /// Mob spawns.
    pub mobs: Vec<MobSpawn>,
    /// Draws needed to produce a solvable grid (1 = first try).
    pub attempts: u32,
}

/// A run of columns sharing one surface elevation.
#[derive(Clone, Copy, Debug)]
struct Segment {
    start: i32,
    /// Inclusive.
    end: i32,
    elevation: i32,
}

impl Segment {
    fn len(self) -> i32 {
        self.end - self.start + 1
    }
}

struct Draft {
    tilemap: Tilemap,
    segments: Vec<Segment>,
    spawn: Cell,
    goal: Cell,
    mobs: Vec<MobSpawn>,
}

/// Produces levels from a validated [`GeneratorConfig`].
#[derive(Clone, Debug)]
pub struct LevelGenerator {
    config: GeneratorConfig,
}

impl LevelGenerator {
    /// Creates a generator.
    ///
    /// # Errors
    ///
    /// [`GenerationError::InvalidConfig`] if the config cannot produce a level.
    pub fn new(config: GeneratorConfig) -> GenerationResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The generator's configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generates a solvable level, drawing the wall theme first.
    ///
    /// # Errors
    ///
    /// [`GenerationError::RetryBudgetExhausted`] if `max_attempts` draws in a
    /// row fail the reachability check.
    pub fn generate<R: Rng>(&self, rng: &mut R) -> GenerationResult<Level> {
        let theme = rng.gen_range(0..self.config.theme_count);

        for attempt in 1..=self.config.max_attempts {
            let mut draft = self.draw(rng, theme);

            if reachability::is_reachable(&draft.tilemap, draft.spawn, draft.goal, self.config.jump) {
                self.decorate(rng, &mut draft);
                tracing::debug!(
                    attempt,
                    theme,
                    segments = draft.segments.len(),
                    mobs = draft.mobs.len(),
                    "level generated"
                );
                return Ok(Level {
                    tilemap: draft.tilemap,
                    spawn: draft.spawn,
                    goal: draft.goal,
                    mobs: draft.mobs,
                    attempts: attempt,
                });
            }

            tracing::debug!(attempt, "level unsolvable, redrawing");
        }

        Err(GenerationError::RetryBudgetExhausted {
            attempts: self.config.max_attempts,
        })
    }

    /// Row of the top solid tile for a column at `elevation`.
    #[inline]
    fn surface_row(&self, elevation: i32) -> i32 {
        self.config.height as i32 - 1 - elevation
    }

    fn draw<R: Rng>(&self, rng: &mut R, theme: u32) -> Draft {
        let c = &self.config;
        let w = c.width as i32;
        let h = c.height as i32;
        let max_elevation = c.max_elevation as i32;
        let max_rise = c.jump.max_rise as i32;
        let max_drop = c.max_step_down as i32;
        let seg_min = c.segment_min as i32;
        let seg_max = c.segment_max as i32;

        let mut map = Tilemap::new(c.width, c.height, theme);

        // =====================================================================
        // Floor and boundary walls
        // =====================================================================
        for x in 0..w {
            map.set(x, h - 1, Tile::GROUND);
        }
        for y in 0..h {
            map.set(0, y, Tile::GROUND);
            map.set(w - 1, y, Tile::GROUND);
        }

        // =====================================================================
        // Platform segments
        // =====================================================================
        let mut segments: Vec<Segment> = Vec::new();
        let mut x = 1;
        let mut elevation = rng.gen_range(1..=max_elevation.min(3));
        let mut len = rng
            .gen_range(seg_min..=seg_max)
            .max(c.spawn_safe_radius as i32 + 1);

        loop {
            let remaining = (w - 1) - x;
            if remaining - len < seg_min {
                len = remaining;
            }

            let segment = Segment {
                start: x,
                end: x + len - 1,
                elevation,
            };
            for col in segment.start..=segment.end {
                for y in self.surface_row(elevation)..h - 1 {
                    map.set(col, y, Tile::GROUND);
                }
            }
            segments.push(segment);
            x += len;
            if x >= w - 1 {
                break;
            }

            match rng.gen_range(0..3) {
                0 => elevation = (elevation + rng.gen_range(1..=max_rise)).min(max_elevation),
                1 => elevation = (elevation - rng.gen_range(1..=max_drop)).max(1),
                _ => {
                    let room = (w - 1) - x - seg_min;
                    if room >= c.gap_min as i32 {
                        let gap = rng
                            .gen_range(c.gap_min as i32..=c.gap_max as i32)
                            .min(room);
                        if rng.gen_bool(f64::from(c.hazard_pit_chance)) {
                            for col in x..x + gap {
                                map.set(col, h - 2, Tile::Lava);
                            }
                        }
                        x += gap;
                        elevation = (elevation + rng.gen_range(-max_drop..=max_rise))
                            .clamp(1, max_elevation);
                    }
                }
            }

            len = rng.gen_range(seg_min..=seg_max);
        }

        // =====================================================================
        // Obstacles and mobs on interior segments
        // =====================================================================
        let mut mobs = Vec::new();
        let interior = segments.len().saturating_sub(1);
        for segment in segments.iter().take(interior).skip(1) {
            let stand_row = self.surface_row(segment.elevation) - 1;

            if rng.gen_bool(f64::from(c.mob_chance)) {
                mobs.push(MobSpawn {
                    cell: Cell::new(segment.start + segment.len() / 2, stand_row),
                    min_x: segment.start as f32,
                    max_x: (segment.end + 1) as f32,
                });
                continue;
            }

            for col in segment.start + 1..segment.end {
                if rng.gen_bool(f64::from(c.obstacle_density)) {
                    let stack = rng.gen_range(1..=max_rise);
                    for k in 0..stack {
                        map.set(col, stand_row - k, Tile::CRATE);
                    }
                }
            }
        }

        let first = segments[0];
        let last = segments[segments.len() - 1];
        let spawn = Cell::new(1, self.surface_row(first.elevation) - 1);
        let goal = Cell::new(w - 2, self.surface_row(last.elevation) - 1);

        Draft {
            tilemap: map,
            segments,
            spawn,
            goal,
            mobs,
        }
    }

    fn decorate<R: Rng>(&self, rng: &mut R, draft: &mut Draft) {
        let density = f64::from(self.config.decor_density);
        for segment in &draft.segments {
            for col in segment.start..=segment.end {
                let Some(row) = draft.tilemap.surface(col) else {
                    continue;
                };
                let cell = Cell::new(col, row);
                if cell == draft.spawn || cell == draft.goal {
                    continue;
                }
                if rng.gen_bool(density) {
                    let variant = rng.gen_range(0..DECOR_VARIANTS);
                    draft.tilemap.set(col, row, Tile::Decor { variant });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn generator() -> LevelGenerator {
        LevelGenerator::new(GeneratorConfig::default()).unwrap()
    }

    #[test]
    fn test_same_seed_same_level() {
        let gen = generator();
        let a = gen.generate(&mut ChaCha8Rng::seed_from_u64(7)).unwrap();
        let b = gen.generate(&mut ChaCha8Rng::seed_from_u64(7)).unwrap();
        assert_eq!(a.tilemap, b.tilemap);
        assert_eq!(a.spawn, b.spawn);
        assert_eq!(a.goal, b.goal);
        assert_eq!(a.mobs, b.mobs);
    }

    #[test]
    fn test_stream_advances_between_levels() {
        let gen = generator();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let a = gen.generate(&mut rng).unwrap();
        let b = gen.generate(&mut rng).unwrap();
        assert_ne!(a.tilemap, b.tilemap);
    }

    #[test]
    fn test_boundary_and_floor_are_solid() {
        let level = generator()
            .generate(&mut ChaCha8Rng::seed_from_u64(1))
            .unwrap();
        let map = &level.tilemap;
        let (w, h) = (map.width() as i32, map.height() as i32);
        for y in 0..h {
            assert!(map.is_solid(0, y));
            assert!(map.is_solid(w - 1, y));
        }
        for x in 0..w {
            assert!(map.is_solid(x, h - 1));
        }
    }

    #[test]
    fn test_spawn_and_goal_are_stands() {
        let level = generator()
            .generate(&mut ChaCha8Rng::seed_from_u64(3))
            .unwrap();
        assert!(level.tilemap.is_stand(level.spawn.x, level.spawn.y));
        assert!(level.tilemap.is_stand(level.goal.x, level.goal.y));
        assert_eq!(level.spawn.x, 1);
        assert_eq!(level.goal.x, level.tilemap.width() as i32 - 2);
    }

    #[test]
    fn test_theme_within_count() {
        let gen = generator();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..20 {
            let level = gen.generate(&mut rng).unwrap();
            assert!(level.tilemap.theme() < gen.config().theme_count);
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = GeneratorConfig {
            theme_count: 0,
            ..GeneratorConfig::default()
        };
        assert!(LevelGenerator::new(config).is_err());
    }
}
