//! # Hazards
//!
//! Answers whether a body touches anything deadly: a hazard tile or an
//! entity carrying [`Hazard`].

use coinrun_core::{EcsResult, Registry, Signature, System, SystemHandle};
use coinrun_procedural::Tilemap;

use crate::components::{Collision, Hazard, Transform};
use crate::physics::{self, Aabb};

/// Tracks entities carrying `Hazard + Transform + Collision`.
pub struct HazardSystem {
    handle: SystemHandle,
}

impl System for HazardSystem {
    const NAME: &'static str = "HazardSystem";
}

impl HazardSystem {
    /// Registers the system.
    ///
    /// # Errors
    ///
    /// Registry errors if the components are unregistered or the system
    /// already exists.
    pub fn register(registry: &mut Registry) -> EcsResult<Self> {
        let handle = registry.register_system::<Self>()?;
        let signature = Signature::EMPTY
            .with(registry.component_type::<Hazard>()?)
            .with(registry.component_type::<Transform>()?)
            .with(registry.component_type::<Collision>()?);
        registry.set_system_signature::<Self>(signature)?;
        Ok(Self { handle })
    }

    /// Returns `true` if `body` overlaps a hazard tile or hazard entity.
    ///
    /// # Errors
    ///
    /// Registry errors if a member lost a required component.
    pub fn touching(&self, registry: &Registry, map: &Tilemap, body: &Aabb) -> EcsResult<bool> {
        if physics::touches_hazard_tile(map, body) {
            return Ok(true);
        }
        for entity in registry.system_entities(self.handle) {
            let transform = *registry.get::<Transform>(entity)?;
            if registry
                .get::<Collision>(entity)?
                .world_box(transform)
                .intersects(body)
            {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_and_entity_contact() {
        let mut registry = Registry::new(4);
        registry.register_component::<Transform>().unwrap();
        registry.register_component::<Collision>().unwrap();
        registry.register_component::<Hazard>().unwrap();
        let system = HazardSystem::register(&mut registry).unwrap();
        registry.seal();

        let map = Tilemap::from_rows(&["#......#", "#~.....#", "########"]);
        let spike = registry.create_entity().unwrap();
        registry.add_component(spike, Transform::new(5.5, 2.0)).unwrap();
        registry
            .add_component(spike, Collision::standing(1.0, 1.0))
            .unwrap();
        registry.add_component(spike, Hazard).unwrap();

        let clear = Aabb::new(3.0, 1.0, 4.0, 2.0);
        let on_lava = Aabb::new(1.2, 1.0, 2.2, 2.0);
        let on_spike = Aabb::new(4.5, 1.0, 5.5, 2.0);
        let beside_spike = Aabb::new(4.0, 1.0, 5.0, 2.0);

        assert!(!system.touching(&registry, &map, &clear).unwrap());
        assert!(system.touching(&registry, &map, &on_lava).unwrap());
        assert!(system.touching(&registry, &map, &on_spike).unwrap());
        assert!(!system.touching(&registry, &map, &beside_spike).unwrap());
    }
}
