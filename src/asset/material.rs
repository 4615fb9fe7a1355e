use super::{Handle, Registry, Shader};
use crate::renderer::device::{GraphicsDevice, UniformValue};
use glam::{Mat4, Vec2, Vec3, Vec4};
use std::collections::HashMap;

/// A stored uniform value. Persistent values are authored and belong in a
/// saved scene; the rest are refreshed by the renderer every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Property {
    pub value: UniformValue,
    pub persistent: bool,
}

#[derive(Debug, Clone)]
pub struct Material {
    name: String,
    shader: Option<Handle<Shader>>,
    properties: HashMap<String, Property>,
}

macro_rules! typed_property {
    ($set:ident, $get:ident, $ty:ty, $variant:ident) => {
        pub fn $set(&mut self, name: &str, value: $ty) {
            self.set(name, UniformValue::$variant(value));
        }

        /// Stored value, or `default` when absent or stored with another type.
        pub fn $get(&self, name: &str, default: $ty) -> $ty {
            match self.properties.get(name) {
                Some(Property {
                    value: UniformValue::$variant(value),
                    ..
                }) => *value,
                Some(other) => {
                    log::warn!(
                        "Material '{}' property '{}' is {}, not {}",
                        self.name,
                        name,
                        other.value.type_name(),
                        stringify!($variant).to_lowercase()
                    );
                    default
                }
                None => default,
            }
        }
    };
}

impl Material {
    pub fn new(name: impl Into<String>, shader: Option<Handle<Shader>>) -> Self {
        Self {
            name: name.into(),
            shader,
            properties: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shader(&self) -> Option<Handle<Shader>> {
        self.shader
    }

    pub fn set_shader(&mut self, shader: Option<Handle<Shader>>) {
        self.shader = shader;
    }

    pub fn set_with(&mut self, name: &str, value: UniformValue, persistent: bool) {
        self.properties
            .insert(name.to_string(), Property { value, persistent });
    }

    pub fn set(&mut self, name: &str, value: UniformValue) {
        self.set_with(name, value, true);
    }

    /// Per-frame value that is never saved with the material.
    pub fn set_transient(&mut self, name: &str, value: UniformValue) {
        self.set_with(name, value, false);
    }

    typed_property!(set_float, get_float, f32, Float);
    typed_property!(set_int, get_int, i32, Int);
    typed_property!(set_vec2, get_vec2, Vec2, Vec2);
    typed_property!(set_vec3, get_vec3, Vec3, Vec3);
    typed_property!(set_vec4, get_vec4, Vec4, Vec4);
    typed_property!(set_mat4, get_mat4, Mat4, Mat4);

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }

    pub fn properties(&self) -> impl Iterator<Item = (&str, &Property)> {
        self.properties.iter().map(|(name, prop)| (name.as_str(), prop))
    }

    pub fn persistent_properties(&self) -> impl Iterator<Item = (&str, &UniformValue)> {
        self.properties
            .iter()
            .filter(|(_, prop)| prop.persistent)
            .map(|(name, prop)| (name.as_str(), &prop.value))
    }

    pub fn clear_transient(&mut self) {
        self.properties.retain(|_, prop| prop.persistent);
    }

    /// True when the material points at a live, linked shader. Warns
    /// otherwise.
    pub fn has_usable_shader(&self, shaders: &Registry<Shader>) -> bool {
        let shader = match self.shader {
            Some(handle) => shaders.get(handle),
            None => None,
        };
        match shader {
            Some(shader) if shader.is_valid() => true,
            Some(shader) => {
                log::warn!(
                    "Material '{}' uses released shader '{}'",
                    self.name,
                    shader.name()
                );
                false
            }
            None => {
                log::warn!("Material '{}' has no valid shader", self.name);
                false
            }
        }
    }

    /// Activate the shader and push every stored property. Returns false,
    /// with a warning, when the material has no usable shader.
    pub fn bind(&self, device: &mut dyn GraphicsDevice, shaders: &mut Registry<Shader>) -> bool {
        if !self.has_usable_shader(shaders) {
            return false;
        }
        let shader = match self.shader {
            Some(handle) => shaders.get_mut(handle),
            None => None,
        };
        let Some(shader) = shader else {
            return false;
        };

        shader.bind(device);
        for (name, prop) in &self.properties {
            shader.set_uniform(device, name, &prop.value);
        }
        true
    }

    pub fn unbind(device: &mut dyn GraphicsDevice) {
        Shader::unbind(device);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatched_type_returns_default() {
        let mut material = Material::new("m", None);
        material.set_int("x", 5);
        assert_eq!(material.get_float("x", 9.9), 9.9);
        assert_eq!(material.get_int("x", 0), 5);
    }

    #[test]
    fn absent_property_returns_default() {
        let material = Material::new("m", None);
        assert_eq!(material.get_vec3("color", Vec3::ONE), Vec3::ONE);
    }

    #[test]
    fn transient_values_are_not_persistent() {
        let mut material = Material::new("m", None);
        material.set_vec3("color", Vec3::ONE);
        material.set_transient("view", Mat4::IDENTITY.into());

        let saved = material
            .persistent_properties()
            .map(|(name, _)| name)
            .collect::<Vec<_>>();
        assert_eq!(saved, vec!["color"]);

        material.clear_transient();
        assert!(material.property("view").is_none());
        assert!(material.property("color").is_some());
    }

    #[test]
    fn bind_without_shader_fails() {
        let mut device = crate::renderer::headless::HeadlessDevice::new();
        let mut shaders = Registry::new();
        assert!(!Material::new("m", None).bind(&mut device, &mut shaders));
    }
}
