//! # Components
//!
//! Plain-data components attached to entities. All positions are in tile
//! units with y growing downward; a [`Transform`] marks the centre of a
//! body's feet.

use coinrun_core::Component;

use crate::physics::Aabb;

/// World position of an entity's feet centre.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Transform {
    /// Horizontal position.
    pub x: f32,
    /// Vertical position (bottom edge of the body).
    pub y: f32,
}

impl Transform {
    /// Creates a transform.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Collision box, offset from the [`Transform`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Collision {
    /// Left edge relative to the transform.
    pub offset_x: f32,
    /// Top edge relative to the transform.
    pub offset_y: f32,
    /// Box width.
    pub width: f32,
    /// Box height.
    pub height: f32,
}

impl Collision {
    /// A box of `width × height` standing on its transform.
    #[inline]
    #[must_use]
    pub fn standing(width: f32, height: f32) -> Self {
        Self {
            offset_x: -width * 0.5,
            offset_y: -height,
            width,
            height,
        }
    }

    /// World-space box for a body at `transform`.
    #[inline]
    #[must_use]
    pub fn world_box(&self, transform: Transform) -> Aabb {
        let min_x = transform.x + self.offset_x;
        let min_y = transform.y + self.offset_y;
        Aabb::new(min_x, min_y, min_x + self.width, min_y + self.height)
    }
}

/// Horizontal and vertical velocity, tiles per second.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Dynamics {
    /// Horizontal velocity.
    pub vx: f32,
    /// Vertical velocity (positive is downward).
    pub vy: f32,
}

/// Draw pass a sprite belongs to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Drawn before the tilemap.
    Behind,
    /// Drawn after the tilemap and particles.
    #[default]
    Ahead,
}

/// What a sprite looks like.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpriteKey {
    /// Patrolling enemy.
    Mob,
    /// The goal coin.
    Coin,
}

/// Visual representation of an entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sprite {
    /// Which image to draw.
    pub key: SpriteKey,
    /// Which pass draws it.
    pub layer: Layer,
    /// Mirror horizontally.
    pub flip: bool,
}

/// Frame cycling for a [`Sprite`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Animation {
    /// Current frame, `0..frame_count`.
    pub frame: u8,
    /// Frames in the cycle.
    pub frame_count: u8,
    /// Seconds per frame.
    pub frame_time: f32,
    /// Seconds accumulated toward the next frame.
    pub timer: f32,
}

impl Animation {
    /// A looping animation starting at frame zero.
    #[inline]
    #[must_use]
    pub const fn looping(frame_count: u8, frame_time: f32) -> Self {
        Self {
            frame: 0,
            frame_count,
            frame_time,
            timer: 0.0,
        }
    }

    /// Advances by `dt`, wrapping at the end of the cycle.
    pub fn advance(&mut self, dt: f32) {
        if self.frame_count <= 1 || self.frame_time <= 0.0 {
            return;
        }
        self.timer += dt;
        while self.timer >= self.frame_time {
            self.timer -= self.frame_time;
            self.frame = (self.frame + 1) % self.frame_count;
        }
    }
}

/// Touching this entity kills the agent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Hazard;

/// Touching this entity completes the level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Goal;

/// Patrol state of a mob.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MobAi {
    /// Left edge of the patrol span.
    pub min_x: f32,
    /// Right edge of the patrol span.
    pub max_x: f32,
    /// `-1.0` or `1.0`.
    pub direction: f32,
    /// Tiles per second.
    pub speed: f32,
}

/// Lifecycle of the agent within an episode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AgentState {
    /// In the air.
    #[default]
    Airborne,
    /// Standing on solid ground.
    Grounded,
    /// Touched a hazard. Terminal.
    Dead,
    /// Touched the goal. Terminal.
    GoalReached,
}

impl AgentState {
    /// Returns `true` for states that end the episode.
    #[inline]
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Dead | Self::GoalReached)
    }
}

/// Horizontal facing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Facing {
    /// Facing left.
    Left,
    /// Facing right.
    #[default]
    Right,
}

/// Control state of the player entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Agent {
    /// Lifecycle state.
    pub state: AgentState,
    /// Last horizontal intent.
    pub facing: Facing,
    /// A jump may start this step. Re-armed whenever the agent stands.
    pub jump_available: bool,
}

/// Particle emitter attached to an entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particles {
    /// Particles to emit on the next particle update.
    pub pending: u16,
    /// Particle colour.
    pub color: [u8; 3],
}

impl Particles {
    /// An idle emitter.
    #[inline]
    #[must_use]
    pub const fn new(color: [u8; 3]) -> Self {
        Self { pending: 0, color }
    }

    /// Queues a burst of `count` particles.
    #[inline]
    pub fn burst(&mut self, count: u16) {
        self.pending = self.pending.saturating_add(count);
    }
}

macro_rules! impl_component {
    ($($ty:ident),* $(,)?) => {
        $(
            impl Component for $ty {
                const NAME: &'static str = stringify!($ty);
            }
        )*
    };
}

impl_component!(
    Transform, Collision, Dynamics, Sprite, Animation, Hazard, Goal, MobAi, Agent, Particles,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standing_box_sits_on_feet() {
        let b = Collision::standing(1.0, 1.0).world_box(Transform::new(3.5, 10.0));
        assert_eq!((b.min_x, b.min_y, b.max_x, b.max_y), (3.0, 9.0, 4.0, 10.0));
    }

    #[test]
    fn test_animation_wraps() {
        let mut anim = Animation::looping(3, 0.1);
        for _ in 0..7 {
            anim.advance(0.1001);
        }
        assert_eq!(anim.frame, 7 % 3);
    }

    #[test]
    fn test_single_frame_animation_is_static() {
        let mut anim = Animation::looping(1, 0.1);
        anim.advance(5.0);
        assert_eq!(anim.frame, 0);
    }

    #[test]
    fn test_terminal_states() {
        assert!(AgentState::Dead.is_terminal());
        assert!(AgentState::GoalReached.is_terminal());
        assert!(!AgentState::Grounded.is_terminal());
        assert!(!AgentState::Airborne.is_terminal());
    }
}
