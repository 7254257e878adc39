//! # Goal

use coinrun_core::{EcsResult, Registry, Signature, System, SystemHandle};

use crate::components::{Collision, Goal, Transform};
use crate::physics::Aabb;

/// Tracks entities carrying `Goal + Transform + Collision`.
pub struct GoalSystem {
    handle: SystemHandle,
}

impl System for GoalSystem {
    const NAME: &'static str = "GoalSystem";
}

impl GoalSystem {
    /// Registers the system.
    ///
    /// # Errors
    ///
    /// Registry errors if the components are unregistered or the system
    /// already exists.
    pub fn register(registry: &mut Registry) -> EcsResult<Self> {
        let handle = registry.register_system::<Self>()?;
        let signature = Signature::EMPTY
            .with(registry.component_type::<Goal>()?)
            .with(registry.component_type::<Transform>()?)
            .with(registry.component_type::<Collision>()?);
        registry.set_system_signature::<Self>(signature)?;
        Ok(Self { handle })
    }

    /// Returns `true` if `body` overlaps any goal.
    ///
    /// # Errors
    ///
    /// Registry errors if a member lost a required component.
    pub fn touching(&self, registry: &Registry, body: &Aabb) -> EcsResult<bool> {
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

    /// Number of goals in the level.
    #[must_use]
    pub fn count(&self, registry: &Registry) -> usize {
        registry.system_len(self.handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goal_contact() {
        let mut registry = Registry::new(4);
        registry.register_component::<Transform>().unwrap();
        registry.register_component::<Collision>().unwrap();
        registry.register_component::<Goal>().unwrap();
        let system = GoalSystem::register(&mut registry).unwrap();
        registry.seal();

        let coin = registry.create_entity().unwrap();
        registry.add_component(coin, Transform::new(8.5, 3.0)).unwrap();
        registry
            .add_component(coin, Collision::standing(1.0, 1.0))
            .unwrap();
        registry.add_component(coin, Goal).unwrap();

        assert_eq!(system.count(&registry), 1);
        assert!(system.touching(&registry, &Aabb::new(7.6, 2.0, 8.6, 3.0)).unwrap());
        assert!(!system.touching(&registry, &Aabb::new(6.0, 2.0, 7.0, 3.0)).unwrap());
    }
}
