use crate::asset::Material;
use crate::renderer::device::UniformValue;
use glam::Vec3;

pub const MAX_DIRECTIONAL_LIGHTS: usize = 4;
pub const MAX_POINT_LIGHTS: usize = 16;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionalLightData {
    pub direction: Vec3,
    pub color: Vec3,
    pub intensity: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLightData {
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Light {
    Directional(DirectionalLightData),
    Point(PointLightData),
}

/// Lights gathered for one frame, capped at what the shaders declare.
#[derive(Clone, Debug, Default)]
pub struct LightsData {
    directional: Vec<DirectionalLightData>,
    point: Vec<PointLightData>,
}

impl LightsData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.directional.clear();
        self.point.clear();
    }

    pub fn add(&mut self, light: &Light) {
        match light {
            Light::Directional(data) => self.add_directional(*data),
            Light::Point(data) => self.add_point(*data),
        }
    }

    pub fn add_directional(&mut self, light: DirectionalLightData) {
        if self.directional.len() >= MAX_DIRECTIONAL_LIGHTS {
            log::warn!(
                "Ignoring directional light beyond the limit of {}",
                MAX_DIRECTIONAL_LIGHTS
            );
            return;
        }
        self.directional.push(light);
    }

    pub fn add_point(&mut self, light: PointLightData) {
        if self.point.len() >= MAX_POINT_LIGHTS {
            log::warn!("Ignoring point light beyond the limit of {}", MAX_POINT_LIGHTS);
            return;
        }
        self.point.push(light);
    }

    pub fn directional_lights(&self) -> &[DirectionalLightData] {
        &self.directional
    }

    pub fn point_lights(&self) -> &[PointLightData] {
        &self.point
    }

    /// Store the light arrays on `material` as per-frame values.
    pub fn apply_to(&self, material: &mut Material) {
        material.set_transient("dirLightCount", UniformValue::Int(self.directional.len() as i32));
        for (i, light) in self.directional.iter().enumerate() {
            material.set_transient(&format!("dirLights[{i}].direction"), light.direction.into());
            material.set_transient(&format!("dirLights[{i}].color"), light.color.into());
            material.set_transient(&format!("dirLights[{i}].intensity"), light.intensity.into());
        }

        material.set_transient("pointLightCount", UniformValue::Int(self.point.len() as i32));
        for (i, light) in self.point.iter().enumerate() {
            material.set_transient(&format!("pointLights[{i}].position"), light.position.into());
            material.set_transient(&format!("pointLights[{i}].color"), light.color.into());
            material.set_transient(&format!("pointLights[{i}].intensity"), light.intensity.into());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(x: f32) -> PointLightData {
        PointLightData {
            position: Vec3::new(x, 0.0, 0.0),
            color: Vec3::ONE,
            intensity: 1.0,
        }
    }

    #[test]
    fn point_lights_are_capped() {
        let mut lights = LightsData::new();
        for i in 0..20 {
            lights.add_point(point(i as f32));
        }
        assert_eq!(lights.point_lights().len(), MAX_POINT_LIGHTS);
        assert_eq!(lights.point_lights()[15].position.x, 15.0);
    }

    #[test]
    fn applied_lights_are_transient() {
        let mut lights = LightsData::new();
        lights.add(&Light::Directional(DirectionalLightData {
            direction: Vec3::NEG_Y,
            color: Vec3::ONE,
            intensity: 0.8,
        }));
        lights.add(&Light::Point(point(2.0)));

        let mut material = Material::new("m", None);
        lights.apply_to(&mut material);

        assert_eq!(material.get_int("dirLightCount", 0), 1);
        assert_eq!(material.get_float("dirLights[0].intensity", 0.0), 0.8);
        assert_eq!(
            material.get_vec3("pointLights[0].position", Vec3::ZERO),
            Vec3::new(2.0, 0.0, 0.0)
        );
        assert_eq!(material.persistent_properties().count(), 0);
    }
}
