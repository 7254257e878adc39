//! # Registry Consistency Integration Test
//!
//! Proves that after arbitrary create/attach/detach/destroy churn, every
//! system set holds exactly the live entities whose components match its
//! signature, and no storage keeps data for a destroyed entity.

use coinrun_core::{Component, EntityId, Registry, Signature, System};

#[derive(Clone, Copy, Debug, PartialEq)]
struct Position(f32, f32);
impl Component for Position {
    const NAME: &'static str = "Position";
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Velocity(f32, f32);
impl Component for Velocity {
    const NAME: &'static str = "Velocity";
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Lethal;
impl Component for Lethal {
    const NAME: &'static str = "Lethal";
}

struct Movement;
impl System for Movement {
    const NAME: &'static str = "Movement";
}

struct Danger;
impl System for Danger {
    const NAME: &'static str = "Danger";
}

/// Tiny LCG so the churn pattern is reproducible without an RNG crate.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
        self.0 >> 33
    }
}

fn setup() -> Registry {
    let mut registry = Registry::new(64);
    let pos = registry.register_component::<Position>().unwrap();
    let vel = registry.register_component::<Velocity>().unwrap();
    let lethal = registry.register_component::<Lethal>().unwrap();

    registry.register_system::<Movement>().unwrap();
    registry.register_system::<Danger>().unwrap();
    registry
        .set_system_signature::<Movement>(Signature::EMPTY.with(pos).with(vel))
        .unwrap();
    registry
        .set_system_signature::<Danger>(Signature::EMPTY.with(pos).with(lethal))
        .unwrap();
    registry.seal();
    registry
}

fn expected_members(registry: &Registry, required: Signature) -> Vec<EntityId> {
    registry
        .iter_alive()
        .filter(|e| {
            registry
                .entity_signature(*e)
                .is_some_and(|s| s.contains_all(required))
        })
        .collect()
}

/// Test: membership equals the signature rule after 5,000 random operations.
#[test]
fn test_membership_matches_signatures_under_churn() {
    let mut registry = setup();
    let movement = registry.system_handle::<Movement>().unwrap();
    let danger = registry.system_handle::<Danger>().unwrap();
    let movement_sig = registry.system_signature(movement).unwrap();
    let danger_sig = registry.system_signature(danger).unwrap();

    let mut rng = Lcg(7);
    let mut live: Vec<EntityId> = Vec::new();
    let mut destroyed: Vec<EntityId> = Vec::new();

    for _ in 0..5_000 {
        match rng.next() % 6 {
            0 | 1 => {
                if let Ok(e) = registry.create_entity() {
                    live.push(e);
                }
            }
            2 if !live.is_empty() => {
                let e = live.swap_remove(rng.next() as usize % live.len());
                assert!(registry.destroy_entity(e));
                destroyed.push(e);
            }
            3 if !live.is_empty() => {
                let e = live[rng.next() as usize % live.len()];
                if !registry.has::<Position>(e) {
                    registry.add_component(e, Position(0.0, 0.0)).unwrap();
                }
            }
            4 if !live.is_empty() => {
                let e = live[rng.next() as usize % live.len()];
                if registry.has::<Velocity>(e) {
                    registry.remove_component::<Velocity>(e).unwrap();
                } else {
                    registry.add_component(e, Velocity(1.0, 0.0)).unwrap();
                }
            }
            5 if !live.is_empty() => {
                let e = live[rng.next() as usize % live.len()];
                if !registry.has::<Lethal>(e) {
                    registry.add_component(e, Lethal).unwrap();
                }
            }
            _ => {}
        }
    }

    let movers: Vec<_> = registry.system_entities(movement).collect();
    let dangers: Vec<_> = registry.system_entities(danger).collect();
    println!(
        "live={} movers={} dangers={} destroyed={}",
        live.len(),
        movers.len(),
        dangers.len(),
        destroyed.len()
    );

    assert_eq!(movers, expected_members(&registry, movement_sig), "Movement set drifted");
    assert_eq!(dangers, expected_members(&registry, danger_sig), "Danger set drifted");

    for e in &destroyed {
        assert!(!registry.is_alive(*e));
        assert!(registry.get::<Position>(*e).is_err(), "stale {e} still readable");
        assert!(registry.storage::<Position>().unwrap().get(*e).is_none());
        assert!(registry.storage::<Velocity>().unwrap().get(*e).is_none());
    }

    let positions = registry.storage::<Position>().unwrap().len();
    let with_position = registry.iter_alive().filter(|e| registry.has::<Position>(*e)).count();
    assert_eq!(positions, with_position, "Position storage holds orphans");
}

/// Test: a system never observes an entity whose components it cannot read.
#[test]
fn test_members_always_have_required_components() {
    let mut registry = setup();
    let movement = registry.system_handle::<Movement>().unwrap();

    for i in 0..32 {
        let e = registry.create_entity().unwrap();
        registry.add_component(e, Position(i as f32, 0.0)).unwrap();
        if i % 3 != 0 {
            registry.add_component(e, Velocity(1.0, 0.0)).unwrap();
        }
    }

    let mut members = Vec::new();
    registry.copy_system_entities(movement, &mut members);
    assert!(!members.is_empty());
    for e in members {
        let vel = *registry.get::<Velocity>(e).unwrap();
        let pos = registry.get_mut::<Position>(e).unwrap();
        pos.0 += vel.0;
    }
}
