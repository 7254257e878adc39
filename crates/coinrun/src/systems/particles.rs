//! # Particle System
//!
//! Short-lived visual-only particles. Emitters ([`Particles`] components)
//! queue bursts; the system turns each queued burst into particles at the
//! emitter's position, moves them, and culls them when they expire.
//!
//! Particles live in a [`RecyclingPool`], so the live count never exceeds
//! the pool capacity: a burst into a full pool recycles the oldest
//! particles. Jitter comes from a dedicated RNG that is reseeded from the
//! episode stream on every reset.

use coinrun_core::{EcsResult, EntityId, Registry, RecyclingPool, Signature, System, SystemHandle};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::components::{Particles, Transform};
use crate::render::{Camera, RenderTarget, Rgba};

/// A single particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    /// Centre, x.
    pub x: f32,
    /// Centre, y.
    pub y: f32,
    /// Velocity, x.
    pub vx: f32,
    /// Velocity, y.
    pub vy: f32,
    /// Seconds lived.
    pub age: f32,
    /// Seconds to live.
    pub lifetime: f32,
    /// Edge length in tiles.
    pub size: f32,
    /// Colour at birth; fades out with age.
    pub color: Rgba,
}

impl Particle {
    /// Remaining life in `[0, 1]`.
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> f32 {
        (1.0 - self.age / self.lifetime).clamp(0.0, 1.0)
    }
}

/// How burst particles are spawned and moved.
#[derive(Clone, Debug, PartialEq)]
pub struct BurstConfig {
    /// Shortest lifetime, seconds.
    pub lifetime_min: f32,
    /// Longest lifetime, seconds.
    pub lifetime_max: f32,
    /// Horizontal speed is drawn from `[-spread, spread]`.
    pub spread: f32,
    /// Slowest upward launch speed.
    pub lift_min: f32,
    /// Fastest upward launch speed.
    pub lift_max: f32,
    /// Downward acceleration.
    pub gravity: f32,
    /// Fraction of velocity lost per second.
    pub drag: f32,
    /// Edge length in tiles.
    pub size: f32,
}

impl Default for BurstConfig {
    fn default() -> Self {
        Self {
            lifetime_min: 0.25,
            lifetime_max: 0.4,
            spread: 2.5,
            lift_min: 0.5,
            lift_max: 2.5,
            gravity: 12.0,
            drag: 2.0,
            size: 0.15,
        }
    }
}

/// Owns the particle pool and its RNG.
pub struct ParticleSystem {
    handle: SystemHandle,
    pool: RecyclingPool<Particle>,
    rng: ChaCha8Rng,
    burst: BurstConfig,
    scratch: Vec<EntityId>,
}

impl System for ParticleSystem {
    const NAME: &'static str = "ParticleSystem";
}

impl ParticleSystem {
    /// Registers the system (members: `Particles + Transform`) and
    /// pre-allocates `capacity` particle slots.
    ///
    /// # Errors
    ///
    /// Registry errors if the components are unregistered or the system
    /// already exists.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn init(registry: &mut Registry, capacity: usize, burst: BurstConfig) -> EcsResult<Self> {
        let handle = registry.register_system::<Self>()?;
        let signature = Signature::EMPTY
            .with(registry.component_type::<Particles>()?)
            .with(registry.component_type::<Transform>()?);
        registry.set_system_signature::<Self>(signature)?;

        Ok(Self {
            handle,
            pool: RecyclingPool::new(capacity),
            rng: ChaCha8Rng::seed_from_u64(0),
            burst,
            scratch: Vec::new(),
        })
    }

    /// Drops every particle and restarts the jitter stream from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.pool.clear();
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    /// Adds a particle, returning the one recycled to make room, if any.
    pub fn spawn(&mut self, particle: Particle) -> Option<Particle> {
        self.pool.insert(particle).1
    }

    /// Live particles.
    #[inline]
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.pool.len()
    }

    /// Pool capacity.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    /// Emits queued bursts, integrates motion and culls expired particles.
    ///
    /// # Errors
    ///
    /// Registry errors if a member lost a required component.
    pub fn update(&mut self, registry: &mut Registry, dt: f32) -> EcsResult<()> {
        registry.copy_system_entities(self.handle, &mut self.scratch);

        for i in 0..self.scratch.len() {
            let entity = self.scratch[i];
            let mut emitter = *registry.get::<Particles>(entity)?;
            if emitter.pending == 0 {
                continue;
            }
            let origin = *registry.get::<Transform>(entity)?;
            let color = Rgba::rgb(emitter.color[0], emitter.color[1], emitter.color[2]);
            for _ in 0..emitter.pending {
                let particle = self.jittered(origin, color);
                self.spawn(particle);
            }
            emitter.pending = 0;
            *registry.get_mut::<Particles>(entity)? = emitter;
        }

        let gravity = self.burst.gravity;
        let damping = (1.0 - self.burst.drag * dt).max(0.0);
        for p in self.pool.iter_mut() {
            p.vy += gravity * dt;
            p.vx *= damping;
            p.vy *= damping;
            p.x += p.vx * dt;
            p.y += p.vy * dt;
            p.age += dt;
        }
        self.pool.retain(|p| p.age < p.lifetime);
        Ok(())
    }

    fn jittered(&mut self, origin: Transform, color: Rgba) -> Particle {
        let b = &self.burst;
        let mut draw = |lo: f32, hi: f32| lo + (hi - lo) * self.rng.gen::<f32>();
        Particle {
            x: origin.x,
            y: origin.y - b.size,
            vx: draw(-b.spread, b.spread),
            vy: -draw(b.lift_min, b.lift_max),
            age: 0.0,
            lifetime: draw(b.lifetime_min, b.lifetime_max),
            size: b.size,
            color,
        }
    }

    /// Draws live particles, faded by remaining life.
    pub fn render(&self, target: &mut impl RenderTarget, camera: &Camera) {
        for p in self.pool.iter() {
            let half = p.size * 0.5;
            let alpha = (p.remaining() * 255.0).round() as u8;
            camera.fill_world(
                target,
                p.x - half,
                p.y - half,
                p.x + half,
                p.y + half,
                p.color.with_alpha(alpha),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(capacity: usize) -> (Registry, ParticleSystem, EntityId) {
        let mut registry = Registry::new(8);
        registry.register_component::<Transform>().unwrap();
        registry.register_component::<Particles>().unwrap();
        let system = ParticleSystem::init(&mut registry, capacity, BurstConfig::default()).unwrap();
        registry.seal();

        let e = registry.create_entity().unwrap();
        registry.add_component(e, Transform::new(2.0, 3.0)).unwrap();
        registry.add_component(e, Particles::new([200, 200, 200])).unwrap();
        (registry, system, e)
    }

    #[test]
    fn test_burst_spawns_and_clears_pending() {
        let (mut registry, mut system, e) = setup(64);
        registry.get_mut::<Particles>(e).unwrap().burst(5);
        system.update(&mut registry, 0.05).unwrap();
        assert_eq!(system.live_count(), 5);
        assert_eq!(registry.get::<Particles>(e).unwrap().pending, 0);
    }

    #[test]
    fn test_live_count_bounded_by_capacity() {
        let (mut registry, mut system, e) = setup(16);
        for _ in 0..10 {
            registry.get_mut::<Particles>(e).unwrap().burst(7);
            system.update(&mut registry, 0.01).unwrap();
            assert!(system.live_count() <= system.capacity());
        }
        assert_eq!(system.live_count(), 16);
    }

    #[test]
    fn test_particles_expire() {
        let (mut registry, mut system, e) = setup(64);
        registry.get_mut::<Particles>(e).unwrap().burst(8);
        for _ in 0..20 {
            system.update(&mut registry, 0.05).unwrap();
        }
        assert_eq!(system.live_count(), 0);
    }

    #[test]
    fn test_reseed_is_deterministic() {
        let run = |seed: u64| {
            let (mut registry, mut system, e) = setup(64);
            system.reseed(seed);
            registry.get_mut::<Particles>(e).unwrap().burst(4);
            system.update(&mut registry, 0.05).unwrap();
            system.pool.iter().copied().collect::<Vec<_>>()
        };
        assert_eq!(run(9), run(9));
        assert_ne!(run(9), run(10));
    }

    #[test]
    fn test_spawn_recycles_oldest() {
        let (_registry, mut system, _) = setup(2);
        let p = |x: f32| Particle {
            x,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            age: 0.0,
            lifetime: 1.0,
            size: 0.1,
            color: Rgba::rgb(0, 0, 0),
        };
        assert!(system.spawn(p(1.0)).is_none());
        assert!(system.spawn(p(2.0)).is_none());
        assert_eq!(system.spawn(p(3.0)).map(|old| old.x), Some(1.0));
    }
}
