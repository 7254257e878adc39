//! # Sprite Rendering
//!
//! Draws sprites in two passes, [`Layer::Behind`] before the tilemap and
//! [`Layer::Ahead`] after it. Within a pass, entities draw in ascending
//! index order, which is also their creation order within an episode.

use coinrun_core::{EcsResult, EntityId, Registry, Signature, System, SystemHandle};

use crate::components::{Animation, Collision, Layer, Sprite, SpriteKey, Transform};
use crate::render::{palette, Camera, RenderTarget};

/// Coin width per spin frame, as a fraction of its box.
const COIN_SPIN: [f32; 4] = [1.0, 0.7, 0.3, 0.7];

/// Draws entities carrying `Sprite + Transform + Collision`.
pub struct SpriteRenderSystem {
    handle: SystemHandle,
    scratch: Vec<EntityId>,
}

impl System for SpriteRenderSystem {
    const NAME: &'static str = "SpriteRenderSystem";
}

impl SpriteRenderSystem {
    /// Registers the system.
    ///
    /// # Errors
    ///
    /// Registry errors if the components are unregistered or the system
    /// already exists.
    pub fn register(registry: &mut Registry) -> EcsResult<Self> {
        let handle = registry.register_system::<Self>()?;
        let signature = Signature::EMPTY
            .with(registry.component_type::<Sprite>()?)
            .with(registry.component_type::<Transform>()?)
            .with(registry.component_type::<Collision>()?);
        registry.set_system_signature::<Self>(signature)?;
        Ok(Self {
            handle,
            scratch: Vec::new(),
        })
    }

    /// Advances the [`Animation`] of every member that has one.
    ///
    /// # Errors
    ///
    /// Registry errors if a member lost a required component.
    pub fn update(&mut self, registry: &mut Registry, dt: f32) -> EcsResult<()> {
        registry.copy_system_entities(self.handle, &mut self.scratch);
        for &entity in &self.scratch {
            if registry.has::<Animation>(entity) {
                registry.get_mut::<Animation>(entity)?.advance(dt);
            }
        }
        Ok(())
    }

    /// Draws every member on `layer`.
    ///
    /// # Errors
    ///
    /// Registry errors if a member lost a required component.
    pub fn render(
        &self,
        registry: &Registry,
        target: &mut impl RenderTarget,
        camera: &Camera,
        layer: Layer,
    ) -> EcsResult<()> {
        for entity in registry.system_entities(self.handle) {
            let sprite = *registry.get::<Sprite>(entity)?;
            if sprite.layer != layer {
                continue;
            }
            let transform = *registry.get::<Transform>(entity)?;
            let bounds = registry.get::<Collision>(entity)?.world_box(transform);
            let frame = if registry.has::<Animation>(entity) {
                usize::from(registry.get::<Animation>(entity)?.frame)
            } else {
                0
            };

            match sprite.key {
                SpriteKey::Coin => {
                    let spin = COIN_SPIN[frame % COIN_SPIN.len()];
                    let half = (bounds.max_x - bounds.min_x) * 0.5 * spin;
                    let cx = bounds.center_x();
                    camera.fill_world(
                        target,
                        cx - half,
                        bounds.min_y,
                        cx + half,
                        bounds.max_y,
                        palette::COIN,
                    );
                    camera.fill_world(
                        target,
                        cx - half * 0.4,
                        bounds.min_y + 0.2,
                        cx + half * 0.4,
                        bounds.max_y - 0.2,
                        palette::COIN.scale(0.8),
                    );
                }
                SpriteKey::Mob => {
                    let bob = if frame % 2 == 0 { 0.0 } else { 0.06 };
                    camera.fill_world(
                        target,
                        bounds.min_x,
                        bounds.min_y + bob,
                        bounds.max_x,
                        bounds.max_y,
                        palette::MOB,
                    );
                    let w = bounds.max_x - bounds.min_x;
                    let eye_x = if sprite.flip {
                        bounds.min_x + w * 0.15
                    } else {
                        bounds.max_x - w * 0.35
                    };
                    let eye_y = bounds.min_y + bob + 0.2;
                    camera.fill_world(
                        target,
                        eye_x,
                        eye_y,
                        eye_x + w * 0.2,
                        eye_y + 0.2,
                        palette::MOB.scale(0.3),
                    );
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Rgba, SoftwareSurface};

    fn setup() -> (Registry, SpriteRenderSystem) {
        let mut registry = Registry::new(8);
        registry.register_component::<Transform>().unwrap();
        registry.register_component::<Collision>().unwrap();
        registry.register_component::<Sprite>().unwrap();
        registry.register_component::<Animation>().unwrap();
        let system = SpriteRenderSystem::register(&mut registry).unwrap();
        registry.seal();
        (registry, system)
    }

    fn spawn(registry: &mut Registry, x: f32, key: SpriteKey, layer: Layer) -> EntityId {
        let e = registry.create_entity().unwrap();
        registry.add_component(e, Transform::new(x, 4.0)).unwrap();
        registry.add_component(e, Collision::standing(1.0, 1.0)).unwrap();
        registry
            .add_component(
                e,
                Sprite {
                    key,
                    layer,
                    flip: false,
                },
            )
            .unwrap();
        e
    }

    #[test]
    fn test_only_requested_layer_draws() {
        let (mut registry, system) = setup();
        spawn(&mut registry, 2.5, SpriteKey::Mob, Layer::Behind);
        let camera = Camera::follow(16, 16, 4.0, 2.5, 3.5);
        let background = Rgba::rgb(0, 0, 0);

        let mut surface = SoftwareSurface::new(16, 16).unwrap();
        surface.clear(background);
        system
            .render(&registry, &mut surface, &camera, Layer::Ahead)
            .unwrap();
        assert!(surface.pixels().chunks(4).all(|p| p == [0, 0, 0, 255]));

        system
            .render(&registry, &mut surface, &camera, Layer::Behind)
            .unwrap();
        assert_eq!(surface.pixel(8, 9), Some(palette::MOB));
    }

    #[test]
    fn test_later_entity_draws_on_top() {
        let (mut registry, system) = setup();
        spawn(&mut registry, 2.5, SpriteKey::Mob, Layer::Ahead);
        spawn(&mut registry, 2.5, SpriteKey::Coin, Layer::Ahead);
        let camera = Camera::follow(16, 16, 4.0, 2.5, 3.5);

        let mut surface = SoftwareSurface::new(16, 16).unwrap();
        surface.clear(Rgba::rgb(0, 0, 0));
        system
            .render(&registry, &mut surface, &camera, Layer::Ahead)
            .unwrap();
        assert_eq!(surface.pixel(6, 9), Some(palette::COIN));
    }

    #[test]
    fn test_update_advances_animation() {
        let (mut registry, mut system) = setup();
        let e = spawn(&mut registry, 2.5, SpriteKey::Coin, Layer::Ahead);
        registry.add_component(e, Animation::looping(4, 0.1)).unwrap();
        system.update(&mut registry, 0.15).unwrap();
        assert_eq!(registry.get::<Animation>(e).unwrap().frame, 1);
    }
}
