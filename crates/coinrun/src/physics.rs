//! # Physics
//!
//! Kinematic movement against the tile grid.
//!
//! Features:
//! - Axis-aligned boxes in tile units (y grows downward)
//! - Axis-separated resolution, x then y
//! - Sub-stepping so no single move exceeds half a tile
//! - Ground probing and lava contact
//! - Discrete jump-arc simulation used to validate tuning against the
//!   level generator's reach

use coinrun_procedural::{JumpArc, Tilemap};
use serde::{Deserialize, Serialize};

use crate::components::{Collision, Transform};
use crate::error::{EnvError, EnvResult};

/// Largest distance a body moves on one axis before collisions are resolved.
pub const MAX_SUBSTEP: f32 = 0.5;

/// Penetration tolerated between a body and solid terrain. Boxes touching
/// within this distance do not count as overlapping.
pub const COLLISION_EPSILON: f32 = 1e-3;

/// Depth of the strip below the feet checked for ground.
pub const GROUND_PROBE: f32 = 0.05;

/// Extra rise a jump must have over the highest ledge it is expected to land on.
const RISE_MARGIN: f32 = 0.25;

// ============================================================================
// AABB
// ============================================================================

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    /// Left edge.
    pub min_x: f32,
    /// Top edge.
    pub min_y: f32,
    /// Right edge.
    pub max_x: f32,
    /// Bottom edge.
    pub max_y: f32,
}

impl Aabb {
    /// Creates a box from its edges.
    #[inline]
    #[must_use]
    pub const fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// The box covering tile `(x, y)`.
    #[inline]
    #[must_use]
    pub fn from_tile(x: i32, y: i32) -> Self {
        Self::new(x as f32, y as f32, (x + 1) as f32, (y + 1) as f32)
    }

    /// Returns `true` if the boxes overlap by more than [`COLLISION_EPSILON`]
    /// on both axes.
    #[inline]
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        let [ox, oy] = self.overlap(other);
        ox > COLLISION_EPSILON && oy > COLLISION_EPSILON
    }

    /// Overlap on each axis. Positive means overlap, negative a gap.
    #[inline]
    #[must_use]
    pub fn overlap(&self, other: &Self) -> [f32; 2] {
        [
            self.max_x.min(other.max_x) - self.min_x.max(other.min_x),
            self.max_y.min(other.max_y) - self.min_y.max(other.min_y),
        ]
    }

    /// Inclusive tile range `(x0, y0, x1, y1)` the box covers by more than
    /// [`COLLISION_EPSILON`].
    #[inline]
    #[must_use]
    pub fn tile_span(&self) -> (i32, i32, i32, i32) {
        (
            (self.min_x + COLLISION_EPSILON).floor() as i32,
            (self.min_y + COLLISION_EPSILON).floor() as i32,
            (self.max_x - COLLISION_EPSILON).floor() as i32,
            (self.max_y - COLLISION_EPSILON).floor() as i32,
        )
    }

    /// Horizontal centre.
    #[inline]
    #[must_use]
    pub fn center_x(&self) -> f32 {
        (self.min_x + self.max_x) * 0.5
    }
}

// ============================================================================
// TUNING
// ============================================================================

/// Movement tuning, in tiles and seconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward acceleration.
    pub gravity: f32,
    /// Upward speed at take-off.
    pub jump_velocity: f32,
    /// Horizontal speed cap.
    pub max_speed: f32,
    /// Horizontal acceleration while grounded.
    pub ground_accel: f32,
    /// Horizontal acceleration while airborne.
    pub air_accel: f32,
    /// Deceleration when grounded without horizontal intent.
    pub friction: f32,
    /// Deceleration when airborne without horizontal intent.
    pub air_drag: f32,
    /// Fall speed cap.
    pub terminal_velocity: f32,
    /// Gravity multiplier while `down` is held in the air.
    pub fast_fall_multiplier: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 40.0,
            jump_velocity: 15.0,
            max_speed: 7.5,
            ground_accel: 60.0,
            air_accel: 30.0,
            friction: 40.0,
            air_drag: 5.0,
            terminal_velocity: 15.0,
            fast_fall_multiplier: 2.0,
        }
    }
}

/// Height and length of a full-speed jump, as the step loop integrates it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JumpReach {
    /// Highest rise above the take-off height.
    pub rise: f32,
    /// Horizontal distance covered before falling back to take-off height.
    pub span: f32,
}

impl PhysicsConfig {
    /// Integrates a jump at `dt` with the same update order the agent uses.
    #[must_use]
    pub fn jump_reach(&self, dt: f32) -> JumpReach {
        let mut vy = -self.jump_velocity;
        let mut y = 0.0_f32;
        let mut x = 0.0_f32;
        let mut apex = 0.0_f32;

        for _ in 0..10_000 {
            vy = (vy + self.gravity * dt).min(self.terminal_velocity);
            x += self.max_speed * dt;
            y += vy * dt;
            apex = apex.min(y);
            if y >= 0.0 {
                break;
            }
        }

        JumpReach {
            rise: -apex,
            span: x,
        }
    }

    /// Checks that every value is usable and that a jump covers `arc`.
    ///
    /// # Errors
    ///
    /// [`EnvError::InvalidConfig`] naming the first bad parameter.
    pub fn validate(&self, dt: f32, arc: JumpArc) -> EnvResult<()> {
        for (name, value) in [
            ("gravity", self.gravity),
            ("jump_velocity", self.jump_velocity),
            ("max_speed", self.max_speed),
            ("ground_accel", self.ground_accel),
            ("air_accel", self.air_accel),
            ("terminal_velocity", self.terminal_velocity),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(EnvError::InvalidConfig(format!(
                    "physics.{name} must be positive, got {value}"
                )));
            }
        }
        for (name, value) in [("friction", self.friction), ("air_drag", self.air_drag)] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(EnvError::InvalidConfig(format!(
                    "physics.{name} must be non-negative, got {value}"
                )));
            }
        }
        if !(self.fast_fall_multiplier.is_finite() && self.fast_fall_multiplier >= 1.0) {
            return Err(EnvError::InvalidConfig(format!(
                "physics.fast_fall_multiplier must be at least 1, got {}",
                self.fast_fall_multiplier
            )));
        }

        let reach = self.jump_reach(dt);
        if reach.rise < arc.max_rise as f32 + RISE_MARGIN {
            return Err(EnvError::InvalidConfig(format!(
                "jump rises {:.2} tiles, levels need {} plus {RISE_MARGIN}",
                reach.rise, arc.max_rise
            )));
        }
        if reach.span < arc.max_span as f32 {
            return Err(EnvError::InvalidConfig(format!(
                "jump spans {:.2} tiles, levels need {}",
                reach.span, arc.max_span
            )));
        }
        Ok(())
    }
}

// ============================================================================
// TILE COLLISION
// ============================================================================

/// Contacts made during one move.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoveResult {
    /// A wall stopped horizontal motion.
    pub blocked_x: bool,
    /// Terrain stopped a downward move.
    pub landed: bool,
    /// A ceiling stopped an upward move.
    pub bumped_head: bool,
}

/// Moves a body by `(dx, dy)`, stopping at solid tiles.
///
/// The move is split into equal sub-steps of at most [`MAX_SUBSTEP`]; each
/// sub-step moves and resolves x, then y. Once an axis is blocked it stays
/// blocked for the rest of the move.
pub fn move_and_collide(
    map: &Tilemap,
    transform: &mut Transform,
    collision: &Collision,
    dx: f32,
    dy: f32,
) -> MoveResult {
    let mut result = MoveResult::default();
    let longest = dx.abs().max(dy.abs());
    let steps = (longest / MAX_SUBSTEP).ceil().max(1.0) as u32;
    let (sx, sy) = (dx / steps as f32, dy / steps as f32);

    for _ in 0..steps {
        if sx != 0.0 && !result.blocked_x {
            result.blocked_x = resolve_x(map, transform, collision, sx);
        }
        if sy != 0.0 && !(result.landed || result.bumped_head) {
            if resolve_y(map, transform, collision, sy) {
                if sy > 0.0 {
                    result.landed = true;
                } else {
                    result.bumped_head = true;
                }
            }
        }
    }

    result
}

fn resolve_x(map: &Tilemap, transform: &mut Transform, collision: &Collision, dx: f32) -> bool {
    transform.x += dx;
    let body = collision.world_box(*transform);
    let (x0, y0, x1, y1) = body.tile_span();

    let mut edge: Option<i32> = None;
    for ty in y0..=y1 {
        for tx in x0..=x1 {
            if map.is_solid(tx, ty) {
                edge = Some(match edge {
                    None => tx,
                    Some(e) if dx > 0.0 => e.min(tx),
                    Some(e) => e.max(tx),
                });
            }
        }
    }

    let Some(tile) = edge else {
        return false;
    };
    if dx > 0.0 {
        transform.x -= body.max_x - tile as f32;
    } else {
        transform.x += (tile + 1) as f32 - body.min_x;
    }
    true
}

fn resolve_y(map: &Tilemap, transform: &mut Transform, collision: &Collision, dy: f32) -> bool {
    transform.y += dy;
    let body = collision.world_box(*transform);
    let (x0, y0, x1, y1) = body.tile_span();

    let mut edge: Option<i32> = None;
    for ty in y0..=y1 {
        for tx in x0..=x1 {
            if map.is_solid(tx, ty) {
                edge = Some(match edge {
                    None => ty,
                    Some(e) if dy > 0.0 => e.min(ty),
                    Some(e) => e.max(ty),
                });
            }
        }
    }

    let Some(tile) = edge else {
        return false;
    };
    if dy > 0.0 {
        transform.y -= body.max_y - tile as f32;
    } else {
        transform.y += (tile + 1) as f32 - body.min_y;
    }
    true
}

/// Returns `true` if solid terrain lies within [`GROUND_PROBE`] below the box.
#[must_use]
pub fn on_ground(map: &Tilemap, body: &Aabb) -> bool {
    let probe = Aabb::new(body.min_x, body.max_y, body.max_x, body.max_y + GROUND_PROBE);
    let (x0, y0, x1, y1) = probe.tile_span();
    (y0..=y1).any(|ty| (x0..=x1).any(|tx| map.is_solid(tx, ty)))
}

/// Returns `true` if the box overlaps a hazard tile.
#[must_use]
pub fn touches_hazard_tile(map: &Tilemap, body: &Aabb) -> bool {
    let (x0, y0, x1, y1) = body.tile_span();
    (y0..=y1).any(|ty| (x0..=x1).any(|tx| map.is_hazard(tx, ty)))
}

/// Deepest overlap between the box and any solid tile, on the shallower
/// axis of each contact. Zero when clear.
#[must_use]
pub fn solid_penetration(map: &Tilemap, body: &Aabb) -> f32 {
    let x0 = body.min_x.floor() as i32;
    let y0 = body.min_y.floor() as i32;
    let x1 = body.max_x.ceil() as i32;
    let y1 = body.max_y.ceil() as i32;

    let mut deepest = 0.0_f32;
    for ty in y0..y1 {
        for tx in x0..x1 {
            if map.is_solid(tx, ty) {
                let [ox, oy] = body.overlap(&Aabb::from_tile(tx, ty));
                deepest = deepest.max(ox.min(oy));
            }
        }
    }
    deepest
}

/// Moves `current` toward `target` by at most `step`.
#[inline]
#[must_use]
pub fn approach(current: f32, target: f32, step: f32) -> f32 {
    if current < target {
        (current + step).min(target)
    } else {
        (current - step).max(target)
    }
}
