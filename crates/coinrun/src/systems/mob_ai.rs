//! # Mob AI
//!
//! Mobs patrol back and forth along their platform. A mob turns around
//! when it reaches the edge of its patrol span, walks into a solid tile,
//! or would step off the ground.

use coinrun_core::{EcsResult, EntityId, Registry, Signature, System, SystemHandle};
use coinrun_procedural::Tilemap;

use crate::components::{Collision, MobAi, Sprite, Transform};
use crate::physics::{self, COLLISION_EPSILON};

/// Mob hitbox edge length, tiles.
pub const MOB_SIZE: f32 = 0.8;

/// Moves entities carrying `MobAi + Transform + Collision`.
pub struct MobAiSystem {
    handle: SystemHandle,
    scratch: Vec<EntityId>,
}

impl System for MobAiSystem {
    const NAME: &'static str = "MobAiSystem";
}

impl MobAiSystem {
    /// Registers the system.
    ///
    /// # Errors
    ///
    /// Registry errors if the components are unregistered or the system
    /// already exists.
    pub fn register(registry: &mut Registry) -> EcsResult<Self> {
        let handle = registry.register_system::<Self>()?;
        let signature = Signature::EMPTY
            .with(registry.component_type::<MobAi>()?)
            .with(registry.component_type::<Transform>()?)
            .with(registry.component_type::<Collision>()?);
        registry.set_system_signature::<Self>(signature)?;
        Ok(Self {
            handle,
            scratch: Vec::new(),
        })
    }

    /// Advances every mob by `dt`.
    ///
    /// # Errors
    ///
    /// Registry errors if a member lost a required component.
    pub fn update(&mut self, registry: &mut Registry, map: &Tilemap, dt: f32) -> EcsResult<()> {
        registry.copy_system_entities(self.handle, &mut self.scratch);

        for &entity in &self.scratch {
            let mut ai = *registry.get::<MobAi>(entity)?;
            let collision = *registry.get::<Collision>(entity)?;
            let before = *registry.get::<Transform>(entity)?;

            let mut transform = before;
            let moved = physics::move_and_collide(
                map,
                &mut transform,
                &collision,
                ai.direction * ai.speed * dt,
                0.0,
            );

            let body = collision.world_box(transform);
            let lead_x = if ai.direction > 0.0 {
                body.max_x - COLLISION_EPSILON
            } else {
                body.min_x + COLLISION_EPSILON
            };
            let feet_row = (body.max_y + COLLISION_EPSILON).floor() as i32;
            let ground_ahead = map.is_solid(lead_x.floor() as i32, feet_row);

            let mut turn = moved.blocked_x;
            if !ground_ahead {
                transform = before;
                turn = true;
            }
            let body = collision.world_box(transform);
            if body.min_x < ai.min_x {
                transform.x += ai.min_x - body.min_x;
                turn = true;
            } else if body.max_x > ai.max_x {
                transform.x -= body.max_x - ai.max_x;
                turn = true;
            }
            if turn {
                ai.direction = -ai.direction;
            }

            *registry.get_mut::<Transform>(entity)? = transform;
            *registry.get_mut::<MobAi>(entity)? = ai;
            if registry.has::<Sprite>(entity) {
                registry.get_mut::<Sprite>(entity)?.flip = ai.direction < 0.0;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Registry, MobAiSystem) {
        let mut registry = Registry::new(8);
        registry.register_component::<Transform>().unwrap();
        registry.register_component::<Collision>().unwrap();
        registry.register_component::<MobAi>().unwrap();
        registry.register_component::<Sprite>().unwrap();
        let system = MobAiSystem::register(&mut registry).unwrap();
        registry.seal();
        (registry, system)
    }

    fn mob(registry: &mut Registry, x: f32, y: f32, min_x: f32, max_x: f32) -> EntityId {
        let e = registry.create_entity().unwrap();
        registry.add_component(e, Transform::new(x, y)).unwrap();
        registry
            .add_component(e, Collision::standing(MOB_SIZE, MOB_SIZE))
            .unwrap();
        registry
            .add_component(
                e,
                MobAi {
                    min_x,
                    max_x,
                    direction: 1.0,
                    speed: 2.0,
                },
            )
            .unwrap();
        e
    }

    #[test]
    fn test_patrol_stays_in_bounds() {
        let map = Tilemap::from_rows(&["#..........#", "############"]);
        let (mut registry, mut system) = setup();
        let e = mob(&mut registry, 3.5, 1.0, 2.0, 6.0);

        let mut turned = false;
        for _ in 0..200 {
            system.update(&mut registry, &map, 0.05).unwrap();
            let t = *registry.get::<Transform>(e).unwrap();
            let body = Collision::standing(MOB_SIZE, MOB_SIZE).world_box(t);
            assert!(
                body.min_x >= 2.0 - 1e-4 && body.max_x <= 6.0 + 1e-4,
                "left patrol span: {body:?}"
            );
            turned |= registry.get::<MobAi>(e).unwrap().direction < 0.0;
        }
        assert!(turned, "mob never turned around");
    }

    #[test]
    fn test_turns_at_wall() {
        let map = Tilemap::from_rows(&["#....#....#", "###########"]);
        let (mut registry, mut system) = setup();
        let e = mob(&mut registry, 4.3, 1.0, 0.0, 20.0);
        for _ in 0..5 {
            system.update(&mut registry, &map, 0.05).unwrap();
        }
        let t = *registry.get::<Transform>(e).unwrap();
        assert!(t.x <= 4.6 + 1e-4, "walked into the wall: {}", t.x);
        assert!(registry.get::<MobAi>(e).unwrap().direction < 0.0);
    }

    #[test]
    fn test_turns_at_ledge() {
        let map = Tilemap::from_rows(&["#.......#", "####....#", "#########"]);
        let (mut registry, mut system) = setup();
        let e = mob(&mut registry, 2.5, 1.0, 0.0, 20.0);
        registry
            .add_component(
                e,
                Sprite {
                    key: crate::components::SpriteKey::Mob,
                    layer: crate::components::Layer::Ahead,
                    flip: false,
                },
            )
            .unwrap();
        let mut turned = false;
        for _ in 0..20 {
            system.update(&mut registry, &map, 0.05).unwrap();
            let t = *registry.get::<Transform>(e).unwrap();
            assert!(t.x + MOB_SIZE * 0.5 <= 4.0 + 1e-4, "stepped off the ledge: {}", t.x);
            let ai = *registry.get::<MobAi>(e).unwrap();
            assert_eq!(registry.get::<Sprite>(e).unwrap().flip, ai.direction < 0.0);
            turned |= ai.direction < 0.0;
        }
        assert!(turned, "mob never turned at the ledge");
    }
}
