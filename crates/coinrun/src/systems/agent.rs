//! # Agent
//!
//! The player-controlled body and its lifecycle:
//!
//! ```text
//!            jump / walk off          land
//!  Grounded ─────────────────▶ Airborne ───▶ Grounded
//!      │                          │
//!      ├── hazard ──▶ Dead        ├── hazard ──▶ Dead
//!      └── goal ────▶ GoalReached └── goal ────▶ GoalReached
//! ```
//!
//! `Dead` and `GoalReached` are sticky until the episode resets. When a
//! single step touches both a hazard and the goal, the goal wins.
//!
//! ## Step order
//!
//! 1. Horizontal acceleration toward the intent (friction or drag when idle)
//! 2. Jump, if the agent stood at the end of the previous step
//! 3. Gravity (scaled while fast-falling), clamped to terminal velocity
//! 4. Sub-stepped tile collision, x then y
//! 5. Goal and hazard contact

use coinrun_core::{EcsResult, EntityId, Registry, Signature, System, SystemHandle};
use coinrun_procedural::Tilemap;

use crate::action::Intent;
use crate::components::{Agent, AgentState, Collision, Dynamics, Facing, Particles, Transform};
use crate::physics::{self, PhysicsConfig};
use crate::render::{Camera, RenderTarget, Rgba};
use crate::systems::{GoalSystem, HazardSystem};

/// Result of one agent update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepOutcome {
    /// The agent can keep acting.
    pub alive: bool,
    /// The agent touched the goal this step or earlier.
    pub goal_reached: bool,
}

impl StepOutcome {
    /// Outcome implied by an agent state.
    #[inline]
    #[must_use]
    pub const fn from_state(state: AgentState) -> Self {
        Self {
            alive: !state.is_terminal(),
            goal_reached: matches!(state, AgentState::GoalReached),
        }
    }
}

/// Moves entities carrying `Agent + Transform + Collision + Dynamics`.
pub struct AgentSystem {
    handle: SystemHandle,
    physics: PhysicsConfig,
    dust_burst: u16,
    scratch: Vec<EntityId>,
}

impl System for AgentSystem {
    const NAME: &'static str = "AgentSystem";
}

impl AgentSystem {
    /// Registers the system.
    ///
    /// # Errors
    ///
    /// Registry errors if the components are unregistered or the system
    /// already exists.
    pub fn register(
        registry: &mut Registry,
        physics: PhysicsConfig,
        dust_burst: u16,
    ) -> EcsResult<Self> {
        let handle = registry.register_system::<Self>()?;
        let signature = Signature::EMPTY
            .with(registry.component_type::<Agent>()?)
            .with(registry.component_type::<Transform>()?)
            .with(registry.component_type::<Collision>()?)
            .with(registry.component_type::<Dynamics>()?);
        registry.set_system_signature::<Self>(signature)?;
        Ok(Self {
            handle,
            physics,
            dust_burst,
            scratch: Vec::new(),
        })
    }

    /// Movement tuning in use.
    #[inline]
    #[must_use]
    pub const fn physics(&self) -> &PhysicsConfig {
        &self.physics
    }

    /// Lowest-index agent entity, if any.
    #[must_use]
    pub fn player(&self, registry: &Registry) -> Option<EntityId> {
        registry.system_entities(self.handle).next()
    }

    /// Advances every agent by `dt` under `intent`.
    ///
    /// The outcome is alive only if every agent is alive, and reports the
    /// goal if any agent reached it.
    ///
    /// # Errors
    ///
    /// Registry errors if a member lost a required component.
    pub fn update(
        &mut self,
        registry: &mut Registry,
        map: &Tilemap,
        hazards: &HazardSystem,
        goals: &GoalSystem,
        intent: Intent,
        dt: f32,
    ) -> EcsResult<StepOutcome> {
        registry.copy_system_entities(self.handle, &mut self.scratch);

        let mut outcome = StepOutcome {
            alive: !self.scratch.is_empty(),
            goal_reached: false,
        };
        for i in 0..self.scratch.len() {
            let entity = self.scratch[i];
            let state = self.step_one(registry, map, hazards, goals, entity, intent, dt)?;
            let one = StepOutcome::from_state(state);
            outcome.alive &= one.alive;
            outcome.goal_reached |= one.goal_reached;
        }
        Ok(outcome)
    }

    #[allow(clippy::too_many_arguments)]
    fn step_one(
        &self,
        registry: &mut Registry,
        map: &Tilemap,
        hazards: &HazardSystem,
        goals: &GoalSystem,
        entity: EntityId,
        intent: Intent,
        dt: f32,
    ) -> EcsResult<AgentState> {
        let mut agent = *registry.get::<Agent>(entity)?;
        if agent.state.is_terminal() {
            return Ok(agent.state);
        }
        let collision = *registry.get::<Collision>(entity)?;
        let mut transform = *registry.get::<Transform>(entity)?;
        let mut dynamics = *registry.get::<Dynamics>(entity)?;
        let p = &self.physics;
        let was_grounded = agent.state == AgentState::Grounded;

        if intent.horizontal == 0 {
            let decel = if was_grounded { p.friction } else { p.air_drag };
            dynamics.vx = physics::approach(dynamics.vx, 0.0, decel * dt);
        } else {
            let target = f32::from(intent.horizontal) * p.max_speed;
            let accel = if was_grounded { p.ground_accel } else { p.air_accel };
            dynamics.vx = physics::approach(dynamics.vx, target, accel * dt);
            agent.facing = if intent.horizontal < 0 {
                Facing::Left
            } else {
                Facing::Right
            };
        }

        let jumped = intent.jump && agent.jump_available;
        if jumped {
            dynamics.vy = -p.jump_velocity;
            agent.jump_available = false;
        }

        let fall = if intent.down && !was_grounded {
            p.fast_fall_multiplier
        } else {
            1.0
        };
        dynamics.vy = (dynamics.vy + p.gravity * fall * dt).min(p.terminal_velocity);

        let moved = physics::move_and_collide(
            map,
            &mut transform,
            &collision,
            dynamics.vx * dt,
            dynamics.vy * dt,
        );
        if moved.blocked_x {
            dynamics.vx = 0.0;
        }
        if moved.landed || moved.bumped_head {
            dynamics.vy = 0.0;
        }

        let body = collision.world_box(transform);
        let grounded = dynamics.vy >= 0.0 && physics::on_ground(map, &body);
        agent.jump_available = grounded;

        agent.state = if goals.touching(registry, &body)? {
            AgentState::GoalReached
        } else if hazards.touching(registry, map, &body)? {
            AgentState::Dead
        } else if grounded {
            AgentState::Grounded
        } else {
            AgentState::Airborne
        };

        if agent.state.is_terminal() {
            tracing::debug!(
                %entity,
                state = ?agent.state,
                x = transform.x,
                y = transform.y,
                "agent reached a terminal state"
            );
        }

        let landed = grounded && !was_grounded;
        if (jumped || landed) && registry.has::<Particles>(entity) {
            registry.get_mut::<Particles>(entity)?.burst(self.dust_burst);
        }

        *registry.get_mut::<Transform>(entity)? = transform;
        *registry.get_mut::<Dynamics>(entity)? = dynamics;
        *registry.get_mut::<Agent>(entity)? = agent;
        Ok(agent.state)
    }

    /// Draws every agent in `color`.
    ///
    /// # Errors
    ///
    /// Registry errors if a member lost a required component.
    pub fn render(
        &self,
        registry: &Registry,
        target: &mut impl RenderTarget,
        camera: &Camera,
        color: Rgba,
    ) -> EcsResult<()> {
        for entity in registry.system_entities(self.handle) {
            let agent = *registry.get::<Agent>(entity)?;
            let transform = *registry.get::<Transform>(entity)?;
            let b = registry.get::<Collision>(entity)?.world_box(transform);
            let body = if agent.state == AgentState::Dead {
                color.scale(0.45)
            } else {
                color
            };

            camera.fill_world(target, b.min_x, b.min_y, b.max_x, b.max_y, body.scale(0.6));
            camera.fill_world(
                target,
                b.min_x + 0.08,
                b.min_y + 0.08,
                b.max_x - 0.08,
                b.max_y - 0.08,
                body,
            );

            let w = b.max_x - b.min_x;
            let eye_x = match agent.facing {
                Facing::Right => b.max_x - w * 0.35,
                Facing::Left => b.min_x + w * 0.15,
            };
            camera.fill_world(
                target,
                eye_x,
                b.min_y + 0.2,
                eye_x + w * 0.2,
                b.min_y + 0.4,
                Rgba::rgb(255, 255, 255),
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Goal, Hazard};

    struct Rig {
        registry: Registry,
        agents: AgentSystem,
        hazards: HazardSystem,
        goals: GoalSystem,
        player: EntityId,
    }

    fn rig(x: f32, y: f32) -> Rig {
        let mut registry = Registry::new(16);
        registry.register_component::<Transform>().unwrap();
        registry.register_component::<Collision>().unwrap();
        registry.register_component::<Dynamics>().unwrap();
        registry.register_component::<Agent>().unwrap();
        registry.register_component::<Particles>().unwrap();
        registry.register_component::<Hazard>().unwrap();
        registry.register_component::<Goal>().unwrap();
        let agents = AgentSystem::register(&mut registry, PhysicsConfig::default(), 4).unwrap();
        let hazards = HazardSystem::register(&mut registry).unwrap();
        let goals = GoalSystem::register(&mut registry).unwrap();
        registry.seal();

        let player = registry.create_entity().unwrap();
        registry.add_component(player, Transform::new(x, y)).unwrap();
        registry
            .add_component(player, Collision::standing(1.0, 1.0))
            .unwrap();
        registry.add_component(player, Dynamics::default()).unwrap();
        registry.add_component(player, Agent::default()).unwrap();
        registry
            .add_component(player, Particles::new([255, 255, 255]))
            .unwrap();

        Rig {
            registry,
            agents,
            hazards,
            goals,
            player,
        }
    }

    impl Rig {
        fn step(&mut self, map: &Tilemap, intent: Intent) -> StepOutcome {
            self.agents
                .update(
                    &mut self.registry,
                    map,
                    &self.hazards,
                    &self.goals,
                    intent,
                    0.05,
                )
                .unwrap()
        }

        fn agent(&self) -> Agent {
            *self.registry.get::<Agent>(self.player).unwrap()
        }

        fn transform(&self) -> Transform {
            *self.registry.get::<Transform>(self.player).unwrap()
        }

        fn place(&mut self, component: impl FnOnce(&mut Registry, EntityId)) {
            let e = self.registry.create_entity().unwrap();
            component(&mut self.registry, e);
        }
    }

    const RIGHT: Intent = Intent {
        horizontal: 1,
        jump: false,
        down: false,
    };
    const JUMP: Intent = Intent {
        horizontal: 0,
        jump: true,
        down: false,
    };

    fn flat() -> Tilemap {
        Tilemap::from_rows(&[
            "#..................#",
            "#..................#",
            "#..................#",
            "#..................#",
            "####################",
        ])
    }

    #[test]
    fn test_falls_and_lands() {
        let map = flat();
        let mut rig = rig(2.5, 1.0);
        for _ in 0..20 {
            rig.step(&map, Intent::IDLE);
        }
        assert_eq!(rig.agent().state, AgentState::Grounded);
        assert!((rig.transform().y - 4.0).abs() < 1e-3);
        assert!(rig.registry.get::<Particles>(rig.player).unwrap().pending > 0, "landing dust");
    }

    #[test]
    fn test_walks_right_up_to_max_speed() {
        let map = flat();
        let mut rig = rig(2.5, 4.0);
        rig.step(&map, Intent::IDLE);
        let start = rig.transform().x;
        for _ in 0..10 {
            rig.step(&map, RIGHT);
        }
        let dyn_ = *rig.registry.get::<Dynamics>(rig.player).unwrap();
        assert!(rig.transform().x > start);
        assert!(dyn_.vx <= PhysicsConfig::default().max_speed + 1e-4);
        assert_eq!(rig.agent().facing, Facing::Right);
    }

    #[test]
    fn test_jump_rises_and_returns() {
        let map = flat();
        let mut rig = rig(5.5, 4.0);
        rig.step(&map, Intent::IDLE);
        assert!(rig.agent().jump_available);

        rig.step(&map, JUMP);
        assert_eq!(rig.agent().state, AgentState::Airborne);
        let mut apex = 4.0_f32;
        for _ in 0..40 {
            rig.step(&map, Intent::IDLE);
            apex = apex.min(rig.transform().y);
        }
        assert!(4.0 - apex > 2.0, "jump too low: apex {apex}");
        assert_eq!(rig.agent().state, AgentState::Grounded);
    }

    #[test]
    fn test_no_double_jump() {
        let map = flat();
        let mut rig = rig(5.5, 4.0);
        rig.step(&map, Intent::IDLE);
        rig.step(&map, JUMP);
        let vy_after_first = rig.registry.get::<Dynamics>(rig.player).unwrap().vy;
        rig.step(&map, JUMP);
        let vy = rig.registry.get::<Dynamics>(rig.player).unwrap().vy;
        assert!(vy > vy_after_first, "second jump in the air: {vy} vs {vy_after_first}");
    }

    #[test]
    fn test_lava_kills_and_state_is_sticky() {
        let map = Tilemap::from_rows(&["#.....#", "#.....#", "#..~..#", "#######"]);
        let mut rig = rig(3.5, 1.0);
        let mut outcome = rig.step(&map, Intent::IDLE);
        for _ in 0..20 {
            if !outcome.alive {
                break;
            }
            outcome = rig.step(&map, Intent::IDLE);
        }
        assert_eq!(
            outcome,
            StepOutcome {
                alive: false,
                goal_reached: false
            }
        );
        let at_death = rig.transform();
        let again = rig.step(&map, RIGHT);
        assert_eq!(again, outcome);
        assert_eq!(rig.transform(), at_death, "dead agents do not move");
        assert_eq!(rig.agent().state, AgentState::Dead);
    }

    #[test]
    fn test_goal_wins_over_hazard() {
        let map = flat();
        let mut rig = rig(5.5, 4.0);
        rig.place(|r, e| {
            r.add_component(e, Transform::new(5.5, 4.0)).unwrap();
            r.add_component(e, Collision::standing(1.0, 1.0)).unwrap();
            r.add_component(e, Hazard).unwrap();
        });
        rig.place(|r, e| {
            r.add_component(e, Transform::new(5.5, 4.0)).unwrap();
            r.add_component(e, Collision::standing(1.0, 1.0)).unwrap();
            r.add_component(e, Goal).unwrap();
        });
        let outcome = rig.step(&map, Intent::IDLE);
        assert_eq!(
            outcome,
            StepOutcome {
                alive: false,
                goal_reached: true
            }
        );
        assert_eq!(rig.agent().state, AgentState::GoalReached);
    }
}
