// scene/scene.rs
use super::components::{Active, Name, Renderable, Tint};
use super::transform::Transform;
use crate::renderer::batch::BatchRenderer;
use crate::renderer::lights::{Light, LightsData};
use glam::Vec4;
use hecs::{Entity, World};
use std::collections::HashMap;

/// Name-keyed entities stored in a hecs world, iterated in creation order.
pub struct Scene {
    pub world: World,
    names: HashMap<String, Entity>,
    order: Vec<Entity>,
    lights: HashMap<String, SceneLight>,
    light_order: Vec<String>,
}

/// A named light and whether it contributes to the frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneLight {
    pub light: Light,
    pub active: bool,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            world: World::new(),
            names: HashMap::new(),
            order: Vec::new(),
            lights: HashMap::new(),
            light_order: Vec::new(),
        }
    }

    /// Spawn an active entity with a white tint. A previous entity with the
    /// same name is replaced.
    pub fn create_entity(&mut self, name: &str, renderable: Renderable, transform: Transform) -> Entity {
        if self.names.contains_key(name) {
            log::warn!("Entity '{}' already exists and will be replaced", name);
            self.destroy_entity(name);
        }

        let entity = self.world.spawn((
            Name::new(name),
            transform,
            renderable,
            Active::default(),
            Tint::default(),
        ));
        self.names.insert(name.to_string(), entity);
        self.order.push(entity);
        entity
    }

    pub fn entity(&self, name: &str) -> Option<Entity> {
        self.names.get(name).copied()
    }

    pub fn entity_count(&self) -> usize {
        self.order.len()
    }

    /// Entity names in iteration order.
    pub fn entity_names(&self) -> Vec<String> {
        self.order
            .iter()
            .filter_map(|&entity| self.world.get::<&Name>(entity).ok().map(|n| n.0.clone()))
            .collect()
    }

    pub fn destroy_entity(&mut self, name: &str) -> bool {
        let Some(entity) = self.names.remove(name) else {
            log::warn!("Cannot destroy unknown entity '{}'", name);
            return false;
        };
        self.order.retain(|&e| e != entity);
        if self.world.despawn(entity).is_err() {
            log::warn!("Entity '{}' was already despawned", name);
        }
        true
    }

    pub fn transform_mut(&mut self, name: &str) -> Option<hecs::RefMut<'_, Transform>> {
        let entity = self.entity(name)?;
        self.world.get::<&mut Transform>(entity).ok()
    }

    pub fn set_active(&mut self, name: &str, active: bool) {
        self.with_component(name, |a: &mut Active| a.0 = active);
    }

    pub fn set_tint(&mut self, name: &str, tint: Vec4) {
        self.with_component(name, |t: &mut Tint| t.0 = tint);
    }

    pub fn set_renderable(&mut self, name: &str, renderable: Renderable) {
        self.with_component(name, |r: &mut Renderable| *r = renderable);
    }

    fn with_component<C: hecs::Component>(&mut self, name: &str, apply: impl FnOnce(&mut C)) {
        let Some(entity) = self.entity(name) else {
            log::warn!("Entity '{}' not found", name);
            return;
        };
        match self.world.get::<&mut C>(entity) {
            Ok(mut component) => apply(&mut *component),
            Err(_) => log::warn!("Entity '{}' is missing a component", name),
        };
    }

    /// Add an active light. Re-adding a name replaces the light in place.
    pub fn add_light(&mut self, name: &str, light: Light) {
        let entry = SceneLight {
            light,
            active: true,
        };
        if self.lights.insert(name.to_string(), entry).is_none() {
            self.light_order.push(name.to_string());
        }
    }

    pub fn remove_light(&mut self, name: &str) -> Option<Light> {
        let entry = self.lights.remove(name)?;
        self.light_order.retain(|n| n != name);
        Some(entry.light)
    }

    pub fn light(&self, name: &str) -> Option<&SceneLight> {
        self.lights.get(name)
    }

    pub fn set_light_active(&mut self, name: &str, active: bool) {
        match self.lights.get_mut(name) {
            Some(entry) => entry.active = active,
            None => log::warn!("Light '{}' not found", name),
        }
    }

    /// Active lights in insertion order, truncated to the shader limits.
    pub fn gather_lights(&self) -> LightsData {
        let mut data = LightsData::new();
        for entry in self
            .light_order
            .iter()
            .filter_map(|name| self.lights.get(name))
            .filter(|entry| entry.active)
        {
            data.add(&entry.light);
        }
        data
    }

    /// Submit every active entity to the renderer once.
    pub fn update(&mut self, renderer: &mut BatchRenderer) {
        for &entity in &self.order {
            let Ok((transform, renderable, active, tint)) = self
                .world
                .query_one_mut::<(&mut Transform, &Renderable, &Active, &Tint)>(entity)
            else {
                continue;
            };
            if !active.0 {
                continue;
            }

            renderer.submit_instanced(
                renderable.mesh,
                renderable.material,
                renderable.texture,
                transform.model_matrix(),
                tint.0,
            );
        }
    }

    pub fn clear(&mut self) {
        self.world.clear();
        self.names.clear();
        self.order.clear();
        self.lights.clear();
        self.light_order.clear();
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
