//! # Simulation
//!
//! One episode's world: registry, systems, level and RNG stream. Each
//! simulation owns all of its state, so any number can run side by side in
//! one process.
//!
//! ## Reset order
//!
//! All randomness comes from one ChaCha8 stream, consumed in this order:
//!
//! 1. Level (wall theme first, then layout, then decorations)
//! 2. Background index, then background offset
//! 3. Particle RNG seed
//! 4. Mob initial directions, in spawn order
//! 5. Agent theme
//!
//! Entities are recreated in a fixed order after `clear_entities`: the
//! agent, the goal, then mobs left to right. Entity indices therefore
//! repeat exactly for a repeated seed.
//!
//! ## Tick order
//!
//! Mobs move, then the agent (so hazard checks see this step's mob
//! positions), then animations, then particles.

use coinrun_core::{EntityId, Registry};
use coinrun_procedural::{Cell, Level, LevelGenerator, Tilemap};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::action::Intent;
use crate::components::{
    Agent, AgentState, Animation, Collision, Dynamics, Goal, Hazard, Layer, MobAi, Particles,
    Sprite, SpriteKey, Transform,
};
use crate::config::EnvConfig;
use crate::error::EnvResult;
use crate::physics;
use crate::render::{self, palette, Camera, RenderTarget, Rgba};
use crate::systems::{
    AgentSystem, BurstConfig, GoalSystem, HazardSystem, MobAiSystem, ParticleSystem,
    SpriteRenderSystem, StepOutcome, MOB_SIZE,
};

/// Agent hitbox edge length, tiles.
pub const AGENT_SIZE: f32 = 1.0;

/// Goal hitbox edge length, tiles.
pub const GOAL_SIZE: f32 = 0.8;

/// The simulated world.
pub struct Simulation {
    config: EnvConfig,
    registry: Registry,
    generator: LevelGenerator,
    rng: ChaCha8Rng,
    level: Level,
    background_index: u32,
    background_offset: f32,
    agent_theme: u32,
    player: EntityId,

    sprites: SpriteRenderSystem,
    mobs: MobAiSystem,
    hazards: HazardSystem,
    goals: GoalSystem,
    agents: AgentSystem,
    particles: ParticleSystem,
}

impl Simulation {
    /// Builds the registry and systems, seeds the stream and generates the
    /// first episode.
    ///
    /// # Errors
    ///
    /// Configuration, registry or generation errors.
    pub fn new(config: EnvConfig, seed: u64) -> EnvResult<Self> {
        config.validate()?;

        let mut registry = Registry::new(config.entity_capacity as usize);
        registry.register_component::<Transform>()?;
        registry.register_component::<Collision>()?;
        registry.register_component::<Dynamics>()?;
        registry.register_component::<Sprite>()?;
        registry.register_component::<Animation>()?;
        registry.register_component::<Hazard>()?;
        registry.register_component::<Goal>()?;
        registry.register_component::<MobAi>()?;
        registry.register_component::<Agent>()?;
        registry.register_component::<Particles>()?;

        let sprites = SpriteRenderSystem::register(&mut registry)?;
        let mobs = MobAiSystem::register(&mut registry)?;
        let hazards = HazardSystem::register(&mut registry)?;
        let goals = GoalSystem::register(&mut registry)?;
        let agents = AgentSystem::register(&mut registry, config.physics.clone(), config.dust_burst)?;
        let burst = BurstConfig {
            lifetime_min: config.particle_lifetime * 0.6,
            lifetime_max: config.particle_lifetime,
            ..BurstConfig::default()
        };
        let particles = ParticleSystem::init(&mut registry, config.particle_capacity as usize, burst)?;
        registry.seal();

        let generator = LevelGenerator::new(config.generator.clone())?;
        let placeholder = Level {
            tilemap: Tilemap::new(config.generator.width, config.generator.height, 0),
            spawn: Cell::new(0, 0),
            goal: Cell::new(0, 0),
            mobs: Vec::new(),
            attempts: 0,
        };

        let mut sim = Self {
            config,
            registry,
            generator,
            rng: ChaCha8Rng::seed_from_u64(seed),
            level: placeholder,
            background_index: 0,
            background_offset: 0.0,
            agent_theme: 0,
            player: EntityId::NULL,
            sprites,
            mobs,
            hazards,
            goals,
            agents,
            particles,
        };
        sim.regenerate()?;
        Ok(sim)
    }

    /// Starts a new episode. With a seed, the stream restarts from it;
    /// without one, it continues from where the last episode left it.
    ///
    /// # Errors
    ///
    /// Registry or generation errors.
    pub fn reset(&mut self, seed: Option<u64>) -> EnvResult<()> {
        if let Some(seed) = seed {
            self.rng = ChaCha8Rng::seed_from_u64(seed);
        }
        self.regenerate()
    }

    fn regenerate(&mut self) -> EnvResult<()> {
        self.registry.clear_entities();

        let level = self.generator.generate(&mut self.rng)?;
        self.background_index = self.rng.gen_range(0..self.config.background_count);
        self.background_offset = self.rng.gen::<f32>();
        let particle_seed = self.rng.gen::<u64>();
        self.particles.reseed(particle_seed);

        self.player = self.spawn_agent(&level)?;
        self.spawn_goal(level.goal)?;
        for mob in &level.mobs {
            let direction = if self.rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            let e = self.registry.create_entity()?;
            let (x, y) = mob.cell.feet();
            self.registry.add_component(e, Transform::new(x, y))?;
            self.registry
                .add_component(e, Collision::standing(MOB_SIZE, MOB_SIZE))?;
            self.registry.add_component(
                e,
                MobAi {
                    min_x: mob.min_x,
                    max_x: mob.max_x,
                    direction,
                    speed: self.config.mob_speed,
                },
            )?;
            self.registry.add_component(e, Hazard)?;
            self.registry.add_component(
                e,
                Sprite {
                    key: SpriteKey::Mob,
                    layer: Layer::Ahead,
                    flip: direction < 0.0,
                },
            )?;
            self.registry.add_component(e, Animation::looping(2, 0.2))?;
        }

        self.agent_theme = self.rng.gen_range(0..self.config.agent_theme_count);
        self.level = level;

        tracing::info!(
            attempts = self.level.attempts,
            wall_theme = self.level.tilemap.theme(),
            background = self.background_index,
            agent_theme = self.agent_theme,
            mobs = self.level.mobs.len(),
            "episode ready"
        );
        Ok(())
    }

    fn spawn_agent(&mut self, level: &Level) -> EnvResult<EntityId> {
        let (x, y) = level.spawn.feet();
        let transform = Transform::new(x, y);
        let collision = Collision::standing(AGENT_SIZE, AGENT_SIZE);
        let grounded = physics::on_ground(&level.tilemap, &collision.world_box(transform));
        let dust = palette::wall_theme(level.tilemap.theme())[0].lerp(Rgba::rgb(255, 255, 255), 0.5);

        let e = self.registry.create_entity()?;
        self.registry.add_component(e, transform)?;
        self.registry.add_component(e, collision)?;
        self.registry.add_component(e, Dynamics::default())?;
        self.registry.add_component(
            e,
            Agent {
                state: if grounded {
                    AgentState::Grounded
                } else {
                    AgentState::Airborne
                },
                jump_available: grounded,
                ..Agent::default()
            },
        )?;
        self.registry
            .add_component(e, Particles::new([dust.r, dust.g, dust.b]))?;
        Ok(e)
    }

    fn spawn_goal(&mut self, cell: Cell) -> EnvResult<EntityId> {
        let (x, y) = cell.feet();
        let e = self.registry.create_entity()?;
        self.registry.add_component(e, Transform::new(x, y))?;
        self.registry
            .add_component(e, Collision::standing(GOAL_SIZE, GOAL_SIZE))?;
        self.registry.add_component(e, Goal)?;
        self.registry.add_component(
            e,
            Sprite {
                key: SpriteKey::Coin,
                layer: Layer::Behind,
                flip: false,
            },
        )?;
        self.registry.add_component(e, Animation::looping(4, 0.12))?;
        Ok(e)
    }

    /// Advances the world by one fixed step.
    ///
    /// # Errors
    ///
    /// Registry errors (wiring bugs).
    pub fn tick(&mut self, intent: Intent) -> EnvResult<StepOutcome> {
        let dt = self.config.dt;
        let map = &self.level.tilemap;

        self.mobs.update(&mut self.registry, map, dt)?;
        let outcome = self.agents.update(
            &mut self.registry,
            map,
            &self.hazards,
            &self.goals,
            intent,
            dt,
        )?;
        self.sprites.update(&mut self.registry, dt)?;
        self.particles.update(&mut self.registry, dt)?;
        Ok(outcome)
    }

    /// Draws the current frame into `target`, centred on the agent.
    ///
    /// # Errors
    ///
    /// Registry errors (wiring bugs).
    pub fn render(&self, target: &mut impl RenderTarget) -> EnvResult<()> {
        let focus = *self.registry.get::<Transform>(self.player)?;
        let camera = Camera::follow(
            target.width(),
            target.height(),
            self.config.view_tiles,
            focus.x,
            focus.y - AGENT_SIZE * 0.5,
        );

        target.clear(Rgba::rgb(0, 0, 0));
        render::draw_background(target, self.background_index, self.background_offset);
        self.sprites
            .render(&self.registry, target, &camera, Layer::Behind)?;
        render::draw_tilemap(target, &camera, &self.level.tilemap);
        self.particles.render(target, &camera);
        self.sprites
            .render(&self.registry, target, &camera, Layer::Ahead)?;
        self.agents.render(
            &self.registry,
            target,
            &camera,
            palette::agent_theme(self.agent_theme),
        )?;
        Ok(())
    }

    /// Configuration in use.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &EnvConfig {
        &self.config
    }

    /// The registry.
    #[inline]
    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The current level.
    #[inline]
    #[must_use]
    pub const fn level(&self) -> &Level {
        &self.level
    }

    /// The agent entity.
    #[inline]
    #[must_use]
    pub const fn player(&self) -> EntityId {
        self.player
    }

    /// The agent's control state.
    ///
    /// # Errors
    ///
    /// Registry errors (wiring bugs).
    pub fn agent(&self) -> EnvResult<Agent> {
        Ok(*self.registry.get::<Agent>(self.player)?)
    }

    /// The agent's feet position.
    ///
    /// # Errors
    ///
    /// Registry errors (wiring bugs).
    pub fn agent_transform(&self) -> EnvResult<Transform> {
        Ok(*self.registry.get::<Transform>(self.player)?)
    }

    /// The agent's world-space collision box.
    ///
    /// # Errors
    ///
    /// Registry errors (wiring bugs).
    pub fn agent_box(&self) -> EnvResult<physics::Aabb> {
        let transform = self.agent_transform()?;
        Ok(self.registry.get::<Collision>(self.player)?.world_box(transform))
    }

    /// Background drawn this episode.
    #[inline]
    #[must_use]
    pub const fn background_index(&self) -> u32 {
        self.background_index
    }

    /// Agent colour theme drawn this episode.
    #[inline]
    #[must_use]
    pub const fn agent_theme(&self) -> u32 {
        self.agent_theme
    }

    /// The particle system.
    #[inline]
    #[must_use]
    pub const fn particles(&self) -> &ParticleSystem {
        &self.particles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_spawns_agent_goal_and_mobs() {
        let sim = Simulation::new(EnvConfig::default(), 1).unwrap();
        let expected = 2 + sim.level().mobs.len();
        assert_eq!(sim.registry().alive_count(), expected);
        assert_eq!(sim.player().index(), 0);

        let t = sim.agent_transform().unwrap();
        assert_eq!((t.x, t.y), sim.level().spawn.feet());
        assert_eq!(sim.agent().unwrap().state, AgentState::Grounded);
    }

    #[test]
    fn test_reset_recreates_entities() {
        let mut sim = Simulation::new(EnvConfig::default(), 5).unwrap();
        for _ in 0..5 {
            sim.reset(None).unwrap();
            assert_eq!(sim.registry().alive_count(), 2 + sim.level().mobs.len());
            assert_eq!(sim.player().index(), 0);
        }
    }

    #[test]
    fn test_seeded_reset_repeats_episode() {
        let mut sim = Simulation::new(EnvConfig::default(), 5).unwrap();
        sim.reset(Some(77)).unwrap();
        let first = (
            sim.level().tilemap.clone(),
            sim.background_index(),
            sim.agent_theme(),
        );
        sim.reset(None).unwrap();
        sim.reset(Some(77)).unwrap();
        let second = (
            sim.level().tilemap.clone(),
            sim.background_index(),
            sim.agent_theme(),
        );
        assert_eq!(first, second);
    }

    #[test]
    fn test_themes_within_counts() {
        let config = EnvConfig::default();
        let mut sim = Simulation::new(config.clone(), 3).unwrap();
        for _ in 0..20 {
            sim.reset(None).unwrap();
            assert!(sim.background_index() < config.background_count);
            assert!(sim.agent_theme() < config.agent_theme_count);
            assert!(sim.level().tilemap.theme() < config.generator.theme_count);
        }
    }
}
